//! Typed parameter, slot and instruction model for parameter realignment.
//!
//! This crate provides the value types every other realignment crate
//! speaks in:
//!
//! - **Types** ([`TypeRef`]) with their descriptor text form, and slot
//!   widths behind the [`SlotWidths`] seam.
//! - **Parameters** ([`TypedParameter`], [`PositionedParameter`],
//!   [`MethodSignature`]), including recognition of tool-generated names
//!   ([`naming`]).
//! - **Instructions** ([`Insn`], [`InsnList`]) exposing a slot view
//!   ([`SlotRef`]) and nothing else the passes do not need.
//! - **Method bodies** ([`MethodBody`], [`LocalVar`]) bundling a signature,
//!   its declared locals and its instructions.
//!
//! # Design
//!
//! Everything here is plain data. Diffing is pure and lives in
//! `realign_diff`; mutation is confined to the applier in `realign_apply`,
//! which takes a `&mut MethodBody` for the length of one call.

pub mod insn;
pub mod method;
pub mod naming;
pub mod param;
pub mod types;

pub use insn::{
    is_reserved_slot, BranchKind, Insn, InsnList, LabelId, SlotRef, ValueKind, MAX_SLOT,
    PLACEHOLDER_SLOT, UNREACHABLE_SLOT,
};
pub use method::{LocalVar, MethodBody, Scope};
pub use naming::{generated_ordinal, is_generated_name};
pub use param::{MethodSignature, PositionedParameter, TypedParameter};
pub use types::{width_of, SlotWidths, StandardWidths, TypeParseError, TypeRef};
