//! Instruction stream model.
//!
//! The realignment passes only need to know three things about an
//! instruction: whether it addresses a local slot (and which), whether it
//! delimits a straight-line run (labels and line markers), and whether
//! control falls through it. [`Insn`] models just enough of a stack machine
//! for that, plus method-call owners for replacement retyping.
//!
//! Slot numbers above [`MAX_SLOT`] are reserved for in-flight rewrites and
//! are never reported by [`InsnList::referenced_slots`].

use smallvec::SmallVec;

use crate::types::TypeRef;

/// Highest slot a method may address.
pub const MAX_SLOT: u32 = 0xFFFF;

/// Slot given to references of a removed parameter that sit in dead code.
pub const UNREACHABLE_SLOT: u32 = u32::MAX;

/// Temporary slot used while a rewrite is half done.
pub const PLACEHOLDER_SLOT: u32 = u32::MAX - 1;

/// `true` for slot numbers outside the addressable range.
#[inline]
pub fn is_reserved_slot(slot: u32) -> bool {
    slot > MAX_SLOT
}

// ── ID newtypes ─────────────────────────────────────────────────────

/// Label within one instruction stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LabelId(u32);

impl LabelId {
    /// Create a label ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Instructions ────────────────────────────────────────────────────

/// Value category moved by a load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl ValueKind {
    /// The category a local of type `ty` is accessed with.
    pub fn of(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Boolean | TypeRef::Byte | TypeRef::Char | TypeRef::Short | TypeRef::Int => {
                ValueKind::Int
            }
            TypeRef::Long => ValueKind::Long,
            TypeRef::Float => ValueKind::Float,
            TypeRef::Double => ValueKind::Double,
            TypeRef::Object(_) | TypeRef::Array(_) => ValueKind::Reference,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    IfNull,
    IfNonNull,
    /// Any other conditional branch.
    Conditional,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Insn {
    /// Push the value held in a local slot.
    Load { slot: u32, kind: ValueKind },
    /// Pop into a local slot.
    Store { slot: u32, kind: ValueKind },
    /// Add a constant to an int local in place.
    Increment { slot: u32, delta: i32 },
    /// Call a method declared on `owner` (internal name).
    Invoke {
        owner: String,
        name: String,
        descriptor: String,
    },
    Const(i64),
    Branch { kind: BranchKind, target: LabelId },
    Jump(LabelId),
    Label(LabelId),
    Line(u32),
    Return,
    Throw,
    /// Any instruction the passes do not look into.
    Op(u8),
}

/// Read/write access to the local slot an instruction addresses.
pub trait SlotRef {
    /// The slot this instruction reads or writes, if any.
    fn slot(&self) -> Option<u32>;

    /// Point the instruction at another slot. Returns `false` when the
    /// instruction has no slot operand.
    fn set_slot(&mut self, slot: u32) -> bool;
}

impl SlotRef for Insn {
    fn slot(&self) -> Option<u32> {
        match self {
            Insn::Load { slot, .. } | Insn::Store { slot, .. } | Insn::Increment { slot, .. } => {
                Some(*slot)
            }
            _ => None,
        }
    }

    fn set_slot(&mut self, new: u32) -> bool {
        match self {
            Insn::Load { slot, .. } | Insn::Store { slot, .. } | Insn::Increment { slot, .. } => {
                *slot = new;
                true
            }
            _ => false,
        }
    }
}

impl Insn {
    /// Labels and line markers end a straight-line run.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Insn::Label(_) | Insn::Line(_))
    }

    #[inline]
    pub fn is_null_check(&self) -> bool {
        matches!(
            self,
            Insn::Branch {
                kind: BranchKind::IfNull | BranchKind::IfNonNull,
                ..
            }
        )
    }

    /// Control never falls through to the next instruction.
    #[inline]
    pub fn is_unconditional_exit(&self) -> bool {
        matches!(self, Insn::Return | Insn::Throw | Insn::Jump(_))
    }

    #[inline]
    pub fn is_load_of(&self, slot: u32) -> bool {
        matches!(self, Insn::Load { slot: s, .. } if *s == slot)
    }

    pub fn call_owner(&self) -> Option<&str> {
        match self {
            Insn::Invoke { owner, .. } => Some(owner),
            _ => None,
        }
    }
}

// ── InsnList ────────────────────────────────────────────────────────

/// A method's instructions, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsnList {
    insns: Vec<Insn>,
}

impl InsnList {
    pub fn new(insns: Vec<Insn>) -> Self {
        InsnList { insns }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.insns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    pub fn as_slice(&self) -> &[Insn] {
        &self.insns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Insn> {
        self.insns.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Insn> {
        self.insns.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Insn> {
        self.insns.get_mut(idx)
    }

    pub fn into_vec(self) -> Vec<Insn> {
        self.insns
    }

    /// Every addressable slot referenced, ascending and without duplicates.
    pub fn referenced_slots(&self) -> SmallVec<[u32; 16]> {
        let mut slots: SmallVec<[u32; 16]> = self
            .insns
            .iter()
            .filter_map(SlotRef::slot)
            .filter(|&slot| !is_reserved_slot(slot))
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Positions of instructions addressing `slot`.
    pub fn positions_of(&self, slot: u32) -> Vec<usize> {
        self.insns
            .iter()
            .enumerate()
            .filter(|(_, insn)| insn.slot() == Some(slot))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Rewrite every slot operand through `f`. Returns how many changed.
    pub fn remap_slots(&mut self, mut f: impl FnMut(u32) -> u32) -> usize {
        let mut changed = 0;
        for insn in &mut self.insns {
            if let Some(old) = insn.slot() {
                let new = f(old);
                if new != old {
                    insn.set_slot(new);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Point every reference to `from` at `to`.
    pub fn retarget(&mut self, from: u32, to: u32) -> usize {
        self.remap_slots(|slot| if slot == from { to } else { slot })
    }

    /// Insert `insns` right after position `idx`.
    pub fn insert_after(&mut self, idx: usize, insns: Vec<Insn>) {
        let at = (idx + 1).min(self.insns.len());
        self.insns.splice(at..at, insns);
    }

    /// Replace the instruction at `idx` with `insns`.
    pub fn replace_at(&mut self, idx: usize, insns: Vec<Insn>) {
        if idx < self.insns.len() {
            self.insns.splice(idx..=idx, insns);
        }
    }

    /// Per-instruction reachability, conservatively: every label may be a
    /// jump target, and nothing after an unconditional exit is reachable
    /// until the next label.
    pub fn reachability(&self) -> Vec<bool> {
        let mut live = true;
        self.insns
            .iter()
            .map(|insn| {
                if matches!(insn, Insn::Label(_)) {
                    live = true;
                }
                let here = live;
                if insn.is_unconditional_exit() {
                    live = false;
                }
                here
            })
            .collect()
    }

    /// First and last label, which together span the whole method.
    pub fn outer_labels(&self) -> Option<(LabelId, LabelId)> {
        let mut labels = self.insns.iter().filter_map(|insn| match insn {
            Insn::Label(id) => Some(*id),
            _ => None,
        });
        let first = labels.next()?;
        let last = labels.last().unwrap_or(first);
        Some((first, last))
    }
}

impl From<Vec<Insn>> for InsnList {
    fn from(insns: Vec<Insn>) -> Self {
        InsnList::new(insns)
    }
}

impl FromIterator<Insn> for InsnList {
    fn from_iter<I: IntoIterator<Item = Insn>>(iter: I) -> Self {
        InsnList::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a InsnList {
    type Item = &'a Insn;
    type IntoIter = std::slice::Iter<'a, Insn>;

    fn into_iter(self) -> Self::IntoIter {
        self.insns.iter()
    }
}

#[cfg(test)]
mod tests;
