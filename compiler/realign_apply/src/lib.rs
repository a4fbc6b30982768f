//! Applying parameter edit scripts to method bodies.
//!
//! An [`EditScript`](realign_diff::EditScript) only talks about parameter
//! ordinals. Applying it to a real method also has to keep the declared
//! locals and every slot operand in the instruction stream consistent with
//! the new parameter list. That is what this crate does.
//!
//! - [`SlotTable`]: ordinal to slot mapping, derived from a signature
//! - [`SlotSnapshot`]: re-indexes locals and instructions after an edit
//! - [`Applier`]: runs a script phase by phase and reports [`Changed`]
//! - [`ReplacementFixer`] / [`InlineGenerators`]: where caller-supplied
//!   instructions come from
//!
//! # Example
//!
//! ```
//! use realign_apply::{Applier, Changed, SlotTable};
//! use realign_diff::diff_types;
//! use realign_ir::{Insn, InsnList, MethodBody, MethodSignature, StandardWidths, ValueKind};
//!
//! let signature = MethodSignature::parse("(ILjava/lang/String;)V", true)?;
//! let insns = InsnList::new(vec![Insn::Load { slot: 1, kind: ValueKind::Reference }]);
//! let mut body = MethodBody::with_parameter_locals(signature, insns, &StandardWidths);
//! let target = MethodSignature::parse("(IZLjava/lang/String;)V", true)?;
//!
//! let script = diff_types(&body.signature.param_types(), &target.param_types())?;
//! let mut slots = SlotTable::default();
//! let changed = Applier::new(&StandardWidths).apply(&script, &mut body, &mut slots)?;
//!
//! assert_eq!(body.signature.descriptor(), "(IZLjava/lang/String;)V");
//! assert!(body.insns.iter().all(|insn| *insn == Insn::Load { slot: 2, kind: ValueKind::Reference }));
//! assert!(changed.contains(Changed::SIGNATURE | Changed::INSTRUCTIONS));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod applier;
pub mod error;
pub mod fixer;
pub mod slots;
pub mod snapshot;

pub use applier::{ApplyOptions, Applier, Changed};
pub use error::ApplyError;
pub use fixer::{GeneratorTable, InlineGenerators, ReplacementFixer, TypeAdapters};
pub use slots::{SlotEntry, SlotTable};
pub use snapshot::SlotSnapshot;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=realign_apply=debug,realign_diff=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
