//! Slot re-indexing around a structural edit.
//!
//! An edit that adds or drops a declared local moves every slot after it.
//! Rather than shifting incrementally while the edit happens, the applier
//! takes a [`SlotSnapshot`] first, edits the parameter list and local table
//! directly, and then calls [`SlotSnapshot::reconcile`]. Reconciling
//! compares the local tables before and after:
//!
//! 1. for every local that disappeared, slots above it move down by its
//!    width;
//! 2. for every local that appeared, slots at or above it move up by its
//!    width. The new entry itself stays put, even when an older local
//!    shares its name.
//!
//! Removals are settled before additions, both against the snapshot, and
//! the result is applied to the instructions in one remapping.
//!
//! Instructions already pointing at a reserved slot (a placeholder or the
//! unreachable sentinel) are left alone, which is how callers keep a
//! reference out of the shift.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use realign_ir::{LocalVar, MethodBody, SlotWidths, TypeRef};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LocalKey {
    name: String,
    ty: TypeRef,
    slot: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Declared {
    key: LocalKey,
    width: u32,
}

impl Declared {
    fn of(local: &LocalVar, widths: &dyn SlotWidths) -> Self {
        Declared {
            key: LocalKey {
                name: local.name.clone(),
                ty: local.ty.clone(),
                slot: local.slot,
            },
            width: widths.width_of(&local.ty),
        }
    }
}

/// The local table and referenced slots of a body at one point in time.
#[derive(Clone, Debug)]
pub struct SlotSnapshot {
    /// Sorted by slot.
    locals: Vec<Declared>,
    referenced: SmallVec<[u32; 16]>,
}

impl SlotSnapshot {
    pub fn take(body: &MethodBody, widths: &dyn SlotWidths) -> Self {
        let mut locals: Vec<Declared> = body
            .locals
            .iter()
            .map(|local| Declared::of(local, widths))
            .collect();
        locals.sort_by_key(|declared| declared.key.slot);
        SlotSnapshot {
            locals,
            referenced: body.insns.referenced_slots(),
        }
    }

    /// Slots referenced by instructions when the snapshot was taken.
    pub fn referenced_slots(&self) -> &[u32] {
        &self.referenced
    }

    /// Shift the body's locals and instructions to account for every local
    /// added or dropped since the snapshot. Returns how many instructions
    /// were rewritten.
    pub fn reconcile(&self, body: &mut MethodBody, widths: &dyn SlotWidths) -> usize {
        let current: Vec<Declared> = body
            .locals
            .iter()
            .map(|local| Declared::of(local, widths))
            .collect();
        let removed: Vec<&Declared> = unmatched(&self.locals, &current)
            .into_iter()
            .filter_map(|idx| self.locals.get(idx))
            .collect();
        // Indices into `body.locals`, lowest slot first.
        let mut added = unmatched(&current, &self.locals);
        added.sort_by_key(|&idx| current[idx].key.slot);
        if removed.is_empty() && added.is_empty() {
            return 0;
        }

        let mut shifted = self.referenced.clone();
        for declared in &removed {
            let LocalKey { slot: at, .. } = declared.key;
            for slot in &mut shifted {
                if *slot > at {
                    *slot = slot.saturating_sub(declared.width);
                }
            }
            for local in &mut body.locals {
                if local.slot > at {
                    local.slot = local.slot.saturating_sub(declared.width);
                }
            }
        }
        for &new in &added {
            let Declared { key, width } = &current[new];
            let at = key.slot;
            for slot in &mut shifted {
                if *slot >= at {
                    *slot += width;
                }
            }
            for (idx, local) in body.locals.iter_mut().enumerate() {
                if idx != new && local.slot >= at {
                    local.slot += width;
                }
            }
        }

        let moves: FxHashMap<u32, u32> = self
            .referenced
            .iter()
            .copied()
            .zip(shifted.iter().copied())
            .filter(|(old, new)| old != new)
            .collect();
        tracing::trace!(
            removed = removed.len(),
            added = added.len(),
            moved = moves.len(),
            "reconciled slots"
        );
        if moves.is_empty() {
            return 0;
        }
        body.insns
            .remap_slots(|slot| moves.get(&slot).copied().unwrap_or(slot))
    }
}

/// Indices of the entries of `from` left over after matching each entry of
/// `minus` once.
fn unmatched(from: &[Declared], minus: &[Declared]) -> Vec<usize> {
    let mut pending: Vec<Option<&Declared>> = minus.iter().map(Some).collect();
    from.iter()
        .enumerate()
        .filter(|(_, declared)| {
            let hit = pending
                .iter_mut()
                .find(|other| other.is_some_and(|other| other == *declared));
            match hit {
                Some(entry) => {
                    *entry = None;
                    false
                }
                None => true,
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
