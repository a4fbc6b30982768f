//! Errors and non-fatal problems.

use std::fmt;

use realign_ir::TypeRef;

use crate::op::EditOperation;

/// The diff could not produce a script. Never accompanied by a partial one.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("parameter diff invariant violated: {reason}")]
    InvariantViolation { reason: String },
}

impl DiffError {
    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        DiffError::InvariantViolation {
            reason: reason.into(),
        }
    }
}

/// Something the diff noticed but resolved without failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffProblem {
    /// A reordered span contains types that occur more than once on both
    /// sides, so no move could be attributed to them. Those parameters were
    /// paired with the target in order of appearance.
    AmbiguousMatch {
        reference: Vec<TypeRef>,
        target: Vec<TypeRef>,
    },
}

impl fmt::Display for DiffProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffProblem::AmbiguousMatch { reference, target } => {
                write!(f, "ambiguous rearrangement of [")?;
                write_types(f, reference)?;
                write!(f, "] into [")?;
                write_types(f, target)?;
                write!(f, "]")
            }
        }
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, types: &[TypeRef]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

/// A script does not fit the parameter list it is replayed against.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("`{op}` is out of range for {len} parameters")]
    IndexOutOfRange { op: EditOperation, len: usize },
    #[error("`{op}` substitutes a parameter with itself")]
    SelfSubstitution { op: EditOperation },
    #[error("substitution of reference parameter {target} redirects to a parameter that does not survive")]
    DanglingSource { target: usize },
}

/// A persisted script could not be read.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("unsupported edit script format version {found} (this build reads {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("malformed edit script: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("cannot read edit script: {0}")]
    Io(#[from] std::io::Error),
}
