//! Parameter-sequence diffing and edit scripts.
//!
//! Given the parameter list a patch was written against and the list the
//! target method has now, [`diff`] produces an [`EditScript`]: an ordered
//! list of [`EditOperation`]s whose sequential replay turns the first list
//! into the second.
//!
//! # Architecture
//!
//! - [`engine`]: the multi-pass diff ([`Differ`], [`diff`], [`diff_types`])
//! - [`linear`]: the single-pass comparator the engine falls back to on
//!   small windows
//! - [`script`]: the layered, sequential [`EditScript`]
//! - [`flat`]: the per-kind [`FlatScript`] the applier consumes, and
//!   [`EditScript::flatten`]
//! - [`persist`]: versioned JSON storage
//!
//! # Example
//!
//! ```
//! use realign_diff::{diff_types, EditOperation};
//! use realign_ir::TypeRef;
//!
//! let string = TypeRef::object("java/lang/String");
//! let script = diff_types(
//!     &[TypeRef::Int, string.clone()],
//!     &[TypeRef::Int, TypeRef::Boolean, string],
//! )?;
//! assert_eq!(
//!     script.ops(),
//!     &[EditOperation::Insert { at: 1, ty: TypeRef::Boolean }]
//! );
//! # Ok::<(), realign_diff::DiffError>(())
//! ```

pub mod engine;
pub mod error;
pub mod flat;
pub mod linear;
pub mod op;
pub mod persist;
pub mod script;

pub use engine::{diff, diff_types, DiffOptions, DiffReport, Differ, NameTieBreak};
pub use error::{DiffError, DiffProblem, PersistError, ScriptError};
pub use flat::{FlatScript, Reorder};
pub use linear::LinearDiff;
pub use op::{EditOperation, GeneratorId, OpKind};
pub use script::EditScript;
