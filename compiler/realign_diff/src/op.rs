//! Edit operations.

use std::fmt;

use realign_ir::TypeRef;

/// Names a caller-supplied instruction sequence that stands in for an
/// inlined parameter. Resolved by the applier's inline generator table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct GeneratorId(u32);

impl GeneratorId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Operation kind, for counting and ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    Insert,
    Replace,
    Substitute,
    Swap,
    Move,
    Remove,
    Inline,
}

/// One step of an edit script.
///
/// Indices are parameter ordinals, never slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Insert a new parameter of type `ty` so that it ends up at `at`.
    Insert {
        at: usize,
        #[serde(rename = "type")]
        ty: TypeRef,
    },
    /// Change the declared type of the parameter at `at`.
    Replace {
        at: usize,
        #[serde(rename = "type")]
        ty: TypeRef,
    },
    /// Exchange two parameters.
    Swap { a: usize, b: usize },
    /// Take the parameter at `from` out and reinsert it at `to`.
    Move { from: usize, to: usize },
    /// Drop the parameter at `at`.
    Remove { at: usize },
    /// Drop `target`, redirecting its uses to `source`.
    Substitute { target: usize, source: usize },
    /// Drop `target`, replacing each load of it with generated code.
    Inline { target: usize, generator: GeneratorId },
}

impl EditOperation {
    pub fn kind(&self) -> OpKind {
        match self {
            EditOperation::Insert { .. } => OpKind::Insert,
            EditOperation::Replace { .. } => OpKind::Replace,
            EditOperation::Swap { .. } => OpKind::Swap,
            EditOperation::Move { .. } => OpKind::Move,
            EditOperation::Remove { .. } => OpKind::Remove,
            EditOperation::Substitute { .. } => OpKind::Substitute,
            EditOperation::Inline { .. } => OpKind::Inline,
        }
    }

    /// The index a sub-range limit is checked against.
    pub fn primary_index(&self) -> usize {
        match *self {
            EditOperation::Insert { at, .. }
            | EditOperation::Replace { at, .. }
            | EditOperation::Remove { at } => at,
            EditOperation::Swap { a, .. } => a,
            EditOperation::Move { from, .. } => from,
            EditOperation::Substitute { target, .. } | EditOperation::Inline { target, .. } => {
                target
            }
        }
    }

    /// The same operation with every index shifted by `delta`.
    #[must_use]
    pub fn offset(&self, delta: usize) -> Self {
        match self {
            EditOperation::Insert { at, ty } => EditOperation::Insert {
                at: at + delta,
                ty: ty.clone(),
            },
            EditOperation::Replace { at, ty } => EditOperation::Replace {
                at: at + delta,
                ty: ty.clone(),
            },
            EditOperation::Swap { a, b } => EditOperation::Swap {
                a: a + delta,
                b: b + delta,
            },
            EditOperation::Move { from, to } => EditOperation::Move {
                from: from + delta,
                to: to + delta,
            },
            EditOperation::Remove { at } => EditOperation::Remove { at: at + delta },
            EditOperation::Substitute { target, source } => EditOperation::Substitute {
                target: target + delta,
                source: source + delta,
            },
            EditOperation::Inline { target, generator } => EditOperation::Inline {
                target: target + delta,
                generator: *generator,
            },
        }
    }

    /// Whether the operation's primary index lies below `limit`.
    #[inline]
    pub fn within_limit(&self, limit: usize) -> bool {
        self.primary_index() < limit
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOperation::Insert { at, ty } => write!(f, "insert {ty} at {at}"),
            EditOperation::Replace { at, ty } => write!(f, "replace {at} with {ty}"),
            EditOperation::Swap { a, b } => write!(f, "swap {a} and {b}"),
            EditOperation::Move { from, to } => write!(f, "move {from} to {to}"),
            EditOperation::Remove { at } => write!(f, "remove {at}"),
            EditOperation::Substitute { target, source } => {
                write!(f, "substitute {target} with {source}")
            }
            EditOperation::Inline { target, generator } => {
                write!(f, "inline {target} via generator {}", generator.raw())
            }
        }
    }
}

#[cfg(test)]
mod tests;
