//! Ordinal to slot mapping.
//!
//! Parameters are laid out back to back after the receiver, each taking
//! as many slots as its type is wide. The table is always derived from a
//! signature and never edited in place: after a structural change the
//! applier builds a fresh one.

use realign_ir::{MethodSignature, SlotWidths, TypeRef, MAX_SLOT};

use crate::error::ApplyError;

/// Where one parameter lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotEntry {
    pub slot: u32,
    pub width: u32,
}

impl SlotEntry {
    /// First slot past this entry.
    #[inline]
    pub fn end(self) -> u32 {
        self.slot + self.width
    }
}

/// Slot of every parameter, by ordinal. Strictly increasing and
/// non-overlapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotTable {
    receiver: u32,
    entries: Vec<SlotEntry>,
}

impl SlotTable {
    pub fn new(signature: &MethodSignature, widths: &dyn SlotWidths) -> Result<Self, ApplyError> {
        Self::from_types(
            signature.params.iter().map(|param| &param.ty),
            signature.receiver_slots(),
            widths,
        )
    }

    /// Lay out `types` after `receiver` slots.
    pub fn from_types<'a>(
        types: impl IntoIterator<Item = &'a TypeRef>,
        receiver: u32,
        widths: &dyn SlotWidths,
    ) -> Result<Self, ApplyError> {
        let limit = MAX_SLOT + 1;
        let mut entries = Vec::new();
        let mut next = receiver;
        for ty in types {
            let width = widths.width_of(ty);
            let end = next
                .checked_add(width)
                .filter(|&end| end <= limit)
                .ok_or(ApplyError::SlotAllocation {
                    required: next.saturating_add(width),
                    limit,
                })?;
            entries.push(SlotEntry { slot: next, width });
            next = end;
        }
        Ok(SlotTable { receiver, entries })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn receiver_slots(&self) -> u32 {
        self.receiver
    }

    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotEntry> + '_ {
        self.entries.iter().copied()
    }

    #[inline]
    pub fn get(&self, ordinal: usize) -> Option<SlotEntry> {
        self.entries.get(ordinal).copied()
    }

    #[inline]
    pub fn slot_of(&self, ordinal: usize) -> Option<u32> {
        self.get(ordinal).map(|entry| entry.slot)
    }

    /// First slot past the last parameter.
    pub fn next_free(&self) -> u32 {
        self.entries.last().map_or(self.receiver, |entry| entry.end())
    }

    /// Ordinal of the parameter starting at `slot`.
    pub fn ordinal_at(&self, slot: u32) -> Option<usize> {
        self.entries.iter().position(|entry| entry.slot == slot)
    }

    /// Slot a parameter inserted at `ordinal` would start at.
    pub fn insertion_slot(&self, ordinal: usize) -> u32 {
        self.slot_of(ordinal).unwrap_or_else(|| self.next_free())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
