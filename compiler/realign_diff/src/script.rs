//! Layered edit scripts.
//!
//! An [`EditScript`] is an ordered list of operations with sequential
//! meaning: each operation's indices refer to the list as it stands after
//! every earlier operation has been applied. This is the form the diff
//! engine produces and the form that gets persisted. The applier consumes
//! the equivalent [`FlatScript`](crate::FlatScript), obtained through
//! [`EditScript::flatten`].

use std::fmt;

use realign_ir::TypeRef;

use crate::error::ScriptError;
use crate::op::{EditOperation, GeneratorId, OpKind};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EditScript {
    ops: Vec<EditOperation>,
}

impl EditScript {
    pub fn new() -> Self {
        EditScript::default()
    }

    pub fn from_ops(ops: Vec<EditOperation>) -> Self {
        EditScript { ops }
    }

    #[inline]
    pub fn ops(&self) -> &[EditOperation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<EditOperation> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditOperation> {
        self.ops.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: EditOperation) -> &mut Self {
        self.ops.push(op);
        self
    }

    // ── Builder shorthands ──────────────────────────────────────────

    pub fn insert(&mut self, at: usize, ty: TypeRef) -> &mut Self {
        self.push(EditOperation::Insert { at, ty })
    }

    pub fn replace(&mut self, at: usize, ty: TypeRef) -> &mut Self {
        self.push(EditOperation::Replace { at, ty })
    }

    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.push(EditOperation::Swap { a, b })
    }

    pub fn move_param(&mut self, from: usize, to: usize) -> &mut Self {
        self.push(EditOperation::Move { from, to })
    }

    pub fn remove(&mut self, at: usize) -> &mut Self {
        self.push(EditOperation::Remove { at })
    }

    pub fn substitute(&mut self, target: usize, source: usize) -> &mut Self {
        self.push(EditOperation::Substitute { target, source })
    }

    pub fn inline(&mut self, target: usize, generator: GeneratorId) -> &mut Self {
        self.push(EditOperation::Inline { target, generator })
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Number of operations of `kind`.
    pub fn count(&self, kind: OpKind) -> usize {
        self.ops.iter().filter(|op| op.kind() == kind).count()
    }

    /// `(at, type)` of every insertion, in script order.
    pub fn insertions(&self) -> Vec<(usize, TypeRef)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                EditOperation::Insert { at, ty } => Some((*at, ty.clone())),
                _ => None,
            })
            .collect()
    }

    /// `(at, type)` of every replacement, in script order.
    pub fn replacements(&self) -> Vec<(usize, TypeRef)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                EditOperation::Replace { at, ty } => Some((*at, ty.clone())),
                _ => None,
            })
            .collect()
    }

    /// Index of every removal, in script order.
    pub fn removals(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                EditOperation::Remove { at } => Some(*at),
                _ => None,
            })
            .collect()
    }

    // ── Composition ─────────────────────────────────────────────────

    /// The operations whose primary index is below `limit`, shifted by
    /// `delta`. Used to lift a script computed for a leading sub-range
    /// into a longer parameter list.
    #[must_use]
    pub fn offset(&self, delta: usize, limit: usize) -> EditScript {
        self.ops
            .iter()
            .filter(|op| op.within_limit(limit))
            .map(|op| op.offset(delta))
            .collect()
    }

    /// Append `other`'s operations with every index shifted by `offset`.
    pub fn merge(&mut self, other: &EditScript, offset: usize) {
        self.ops.extend(other.ops.iter().map(|op| op.offset(offset)));
    }

    /// Run the script over a type list.
    pub fn replay(&self, types: &[TypeRef]) -> Result<Vec<TypeRef>, ScriptError> {
        let mut list = types.to_vec();
        let mut retype = TypeReplay;
        for op in &self.ops {
            step(&mut list, op, &mut retype)?;
        }
        Ok(list)
    }
}

impl FromIterator<EditOperation> for EditScript {
    fn from_iter<I: IntoIterator<Item = EditOperation>>(iter: I) -> Self {
        EditScript::from_ops(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditOperation;
    type IntoIter = std::slice::Iter<'a, EditOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{op}")?;
        }
        f.write_str("]")
    }
}

// ── Sequential replay ───────────────────────────────────────────────

/// How an element left the list.
pub(crate) enum Dropped<T> {
    Removed,
    Substituted(T),
    Inlined(GeneratorId),
}

/// Element bookkeeping for [`step`].
pub(crate) trait Replay<T> {
    fn insert(&mut self, ty: &TypeRef) -> T;
    fn replace(&mut self, item: &mut T, ty: &TypeRef);
    fn dropped(&mut self, _item: T, _how: Dropped<T>) {}
}

struct TypeReplay;

impl Replay<TypeRef> for TypeReplay {
    fn insert(&mut self, ty: &TypeRef) -> TypeRef {
        ty.clone()
    }

    fn replace(&mut self, item: &mut TypeRef, ty: &TypeRef) {
        *item = ty.clone();
    }
}

/// Apply one operation to `list` with sequential semantics.
pub(crate) fn step<T: Clone, R: Replay<T>>(
    list: &mut Vec<T>,
    op: &EditOperation,
    replay: &mut R,
) -> Result<(), ScriptError> {
    let len = list.len();
    let out_of_range = || ScriptError::IndexOutOfRange {
        op: op.clone(),
        len,
    };
    match op {
        EditOperation::Insert { at, ty } => {
            if *at > len {
                return Err(out_of_range());
            }
            let item = replay.insert(ty);
            list.insert(*at, item);
        }
        EditOperation::Replace { at, ty } => {
            let item = list.get_mut(*at).ok_or_else(out_of_range)?;
            replay.replace(item, ty);
        }
        EditOperation::Swap { a, b } => {
            if *a >= len || *b >= len {
                return Err(out_of_range());
            }
            list.swap(*a, *b);
        }
        EditOperation::Move { from, to } => {
            if *from >= len || *to >= len {
                return Err(out_of_range());
            }
            let item = list.remove(*from);
            list.insert(*to, item);
        }
        EditOperation::Remove { at } => {
            if *at >= len {
                return Err(out_of_range());
            }
            let item = list.remove(*at);
            replay.dropped(item, Dropped::Removed);
        }
        EditOperation::Substitute { target, source } => {
            if target == source {
                return Err(ScriptError::SelfSubstitution { op: op.clone() });
            }
            if *target >= len || *source >= len {
                return Err(out_of_range());
            }
            let replacement = list[*source].clone();
            let item = list.remove(*target);
            replay.dropped(item, Dropped::Substituted(replacement));
        }
        EditOperation::Inline { target, generator } => {
            if *target >= len {
                return Err(out_of_range());
            }
            let item = list.remove(*target);
            replay.dropped(item, Dropped::Inlined(*generator));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
