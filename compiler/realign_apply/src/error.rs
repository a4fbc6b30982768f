//! Apply errors.
//!
//! Nothing is rolled back when an error is returned: the body may be left
//! with some operations applied. Callers that need all-or-nothing keep a
//! clone of the body.

use realign_diff::{GeneratorId, ScriptError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The parameter being removed is still read or written by live code.
    #[error("cannot remove parameter {ordinal}: slot {slot} is still used by instruction {at}")]
    UnsupportedRemoval { ordinal: usize, slot: u32, at: usize },

    /// The parameters no longer fit in the addressable slot range.
    #[error("parameters need {required} slots, only {limit} are addressable")]
    SlotAllocation { required: u32, limit: u32 },

    #[error("parameter {ordinal} is out of range for {len} parameters")]
    OrdinalOutOfRange { ordinal: usize, len: usize },

    /// Every parameter must have a declared local at its slot.
    #[error("parameter {ordinal} has no declared local at slot {slot}")]
    MissingLocal { ordinal: usize, slot: u32 },

    #[error("no instructions registered for inline generator {} (parameter {ordinal})", generator.raw())]
    MissingGenerator { generator: GeneratorId, ordinal: usize },

    /// An inlined parameter can only be read.
    #[error("cannot inline parameter {ordinal}: instruction {at} writes to it")]
    InlineWrite { ordinal: usize, at: usize },

    #[error(transparent)]
    Script(#[from] ScriptError),
}
