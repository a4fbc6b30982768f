//! Replaying edit scripts against a method body.
//!
//! The applier works on the flat form of a script and runs each operation
//! kind as its own phase, in a fixed order:
//!
//! 1. **Insertions**, ascending. Each one declares a synthetic local at the
//!    slot the parameter now starts at, and pushes everything above it up.
//! 2. **Replacements**. The parameter and its local are retyped in place.
//!    Between object types, calls made on the loaded value are retyped and
//!    the [`ReplacementFixer`] may add adapters after each load.
//! 3. **Substitutions**, descending by target. References to the target
//!    are redirected to the source once the target's slot is gone.
//! 4. **Swaps and moves**, composed into one permutation and remapped in
//!    a single pass, so two parameters trading slots never collide.
//! 5. **Removals**, descending. References from live code are an error
//!    unless [`ApplyOptions::reject_live_removals`] is off; the rest point
//!    at [`UNREACHABLE_SLOT`].
//! 6. **Inlines**, descending. Reads are replaced by the instructions of
//!    the registered generator.
//!
//! Every structural edit goes through a [`SlotSnapshot`], and the slot
//! table is rebuilt from the signature after it.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use realign_diff::flat::{current_index, descending, substitutions_descending};
use realign_diff::{EditOperation, EditScript, FlatScript, GeneratorId, Reorder, ScriptError};
use realign_ir::{
    is_reserved_slot, Insn, LocalVar, MethodBody, SlotWidths, TypeRef, TypedParameter,
    PLACEHOLDER_SLOT, UNREACHABLE_SLOT,
};

use crate::error::ApplyError;
use crate::fixer::{InlineGenerators, ReplacementFixer};
use crate::slots::{SlotEntry, SlotTable};
use crate::snapshot::SlotSnapshot;

bitflags! {
    /// What an apply call changed.
    ///
    /// Callers use this to decide which derived data (descriptors, stack
    /// map frames) must be recomputed.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Changed: u8 {
        /// The parameter list or a parameter type.
        const SIGNATURE = 1 << 0;
        /// The slot of at least one parameter.
        const SLOTS = 1 << 1;
        /// At least one instruction was rewritten, added or removed.
        const INSTRUCTIONS = 1 << 2;
        /// Stack map frames are stale.
        const FRAMES = 1 << 3;
    }
}

// ── Options ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Inserted parameters are named `<prefix><ordinal>`.
    pub injected_prefix: String,
    /// Fail when a removed parameter is still used by live code. When off,
    /// those references are pointed at [`UNREACHABLE_SLOT`] as well.
    pub reject_live_removals: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            injected_prefix: "injected_".to_owned(),
            reject_live_removals: true,
        }
    }
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_injected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.injected_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_reject_live_removals(mut self, reject: bool) -> Self {
        self.reject_live_removals = reject;
        self
    }
}

// ── Applier ─────────────────────────────────────────────────────────

/// Applies scripts to method bodies. Holds no state between calls.
pub struct Applier<'a> {
    widths: &'a dyn SlotWidths,
    fixer: Option<&'a dyn ReplacementFixer>,
    generators: Option<&'a dyn InlineGenerators>,
    options: ApplyOptions,
}

impl<'a> Applier<'a> {
    pub fn new(widths: &'a dyn SlotWidths) -> Self {
        Applier {
            widths,
            fixer: None,
            generators: None,
            options: ApplyOptions::default(),
        }
    }

    #[must_use]
    pub fn with_fixer(mut self, fixer: &'a dyn ReplacementFixer) -> Self {
        self.fixer = Some(fixer);
        self
    }

    #[must_use]
    pub fn with_generators(mut self, generators: &'a dyn InlineGenerators) -> Self {
        self.generators = Some(generators);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.options
    }

    /// Apply a layered script. Indices are read against the body's current
    /// parameter list.
    ///
    /// `slots` is replaced with the table of the final signature.
    pub fn apply(
        &self,
        script: &EditScript,
        body: &mut MethodBody,
        slots: &mut SlotTable,
    ) -> Result<Changed, ApplyError> {
        let flat = script.flatten(body.signature.params.len())?;
        self.apply_flat(&flat, body, slots)
    }

    /// Apply a script already in flat form.
    pub fn apply_flat(
        &self,
        flat: &FlatScript,
        body: &mut MethodBody,
        slots: &mut SlotTable,
    ) -> Result<Changed, ApplyError> {
        let before = SlotTable::new(&body.signature, self.widths)?;
        tracing::debug!(
            operations = flat.len(),
            descriptor = %body.signature.descriptor(),
            "applying edit script"
        );

        let mut pass = Pass {
            applier: self,
            table: before.clone(),
            body: &mut *body,
            reorders: flat.reorders.clone(),
            changed: Changed::empty(),
        };
        pass.insertions(&flat.insertions)?;
        pass.replacements(&flat.replacements)?;
        pass.substitutions(&flat.substitutions)?;
        pass.reorders()?;
        pass.removals(&flat.removals)?;
        pass.inlines(&flat.inlines)?;

        let Pass {
            table, mut changed, ..
        } = pass;
        if table != before {
            changed |= Changed::SLOTS;
        }
        tracing::debug!(
            ?changed,
            descriptor = %body.signature.descriptor(),
            "applied edit script"
        );
        *slots = table;
        Ok(changed)
    }
}

// ── Pass ────────────────────────────────────────────────────────────

/// State of one apply call.
struct Pass<'p, 'a> {
    applier: &'p Applier<'a>,
    body: &'p mut MethodBody,
    table: SlotTable,
    /// Swaps and moves not yet applied, shifted as parameters come and go.
    reorders: Vec<Reorder>,
    changed: Changed,
}

impl Pass<'_, '_> {
    fn widths(&self) -> &dyn SlotWidths {
        self.applier.widths
    }

    fn rebuild(&mut self) -> Result<(), ApplyError> {
        self.table = SlotTable::new(&self.body.signature, self.applier.widths)?;
        Ok(())
    }

    fn rewrote(&mut self, count: usize) {
        if count > 0 {
            self.changed |= Changed::INSTRUCTIONS;
        }
    }

    fn entry(&self, ordinal: usize) -> Result<SlotEntry, ApplyError> {
        self.table.get(ordinal).ok_or(ApplyError::OrdinalOutOfRange {
            ordinal,
            len: self.table.len(),
        })
    }

    fn param_mut(&mut self, ordinal: usize) -> Result<&mut TypedParameter, ApplyError> {
        let len = self.body.signature.params.len();
        self.body
            .signature
            .params
            .get_mut(ordinal)
            .ok_or(ApplyError::OrdinalOutOfRange { ordinal, len })
    }

    /// Index of the local declared for the parameter at `ordinal`.
    fn local_of(&self, ordinal: usize, slot: u32) -> Result<usize, ApplyError> {
        let name = self
            .body
            .signature
            .params
            .get(ordinal)
            .and_then(|param| param.name.as_deref());
        self.body
            .local_index(slot, name)
            .ok_or(ApplyError::MissingLocal { ordinal, slot })
    }

    /// Drop the parameter at `ordinal` and its local, pointing remaining
    /// references at `retarget` before everything above moves down.
    fn drop_parameter(&mut self, ordinal: usize, retarget: u32) -> Result<SlotEntry, ApplyError> {
        let entry = self.entry(ordinal)?;
        let local = self.local_of(ordinal, entry.slot)?;
        let snapshot = SlotSnapshot::take(self.body, self.widths());
        let mut rewritten = self.body.insns.retarget(entry.slot, retarget);
        self.body.signature.params.remove(ordinal);
        self.body.locals.remove(local);
        rewritten += snapshot.reconcile(self.body, self.applier.widths);
        self.rewrote(rewritten);
        self.rebuild()?;
        self.changed |= Changed::SIGNATURE | Changed::FRAMES;
        Ok(entry)
    }

    // ── 1. Insertions ───────────────────────────────────────────────

    fn insertions(&mut self, insertions: &[(usize, TypeRef)]) -> Result<(), ApplyError> {
        let mut sorted = insertions.to_vec();
        sorted.sort_by_key(|(at, _)| *at);
        for (at, ty) in sorted {
            let len = self.body.signature.params.len();
            if at > len {
                return Err(ApplyError::OrdinalOutOfRange { ordinal: at, len });
            }
            let slot = self.table.insertion_slot(at);
            let name = format!("{}{at}", self.applier.options.injected_prefix);
            tracing::debug!(at, ty = %ty, slot, name = %name, "injecting parameter");

            let snapshot = SlotSnapshot::take(self.body, self.widths());
            self.body
                .signature
                .params
                .insert(at, TypedParameter::synthetic(ty.clone(), name.clone()));
            for reorder in &mut self.reorders {
                *reorder = reorder.shifted_for_insertion(at);
            }
            let scope = self.body.method_scope();
            let position = self
                .body
                .locals
                .iter()
                .position(|local| local.slot >= slot)
                .unwrap_or(self.body.locals.len());
            self.body.locals.insert(
                position,
                LocalVar {
                    name,
                    ty,
                    slot,
                    scope,
                },
            );
            let rewritten = snapshot.reconcile(self.body, self.applier.widths);
            self.rewrote(rewritten);
            self.rebuild()?;
            self.changed |= Changed::SIGNATURE;
        }
        Ok(())
    }

    // ── 2. Replacements ─────────────────────────────────────────────

    fn replacements(&mut self, replacements: &[(usize, TypeRef)]) -> Result<(), ApplyError> {
        for (at, ty) in replacements {
            let entry = self.entry(*at)?;
            let param = self.param_mut(*at)?;
            let old = std::mem::replace(&mut param.ty, ty.clone());
            let name = param.name.clone();
            tracing::debug!(at, from = %old, to = %ty, slot = entry.slot, "replacing parameter type");

            if let Some(idx) = self.body.local_index(entry.slot, name.as_deref()) {
                if let Some(local) = self.body.locals.get_mut(idx) {
                    local.ty = ty.clone();
                }
            }
            let width = self.widths().width_of(ty);
            if width != entry.width {
                self.resize(entry, width);
            }
            if old.is_object() && ty.is_object() {
                self.retype_calls(entry.slot, &old, ty);
                self.insert_adapters(entry.slot, &old, ty);
            }
            self.rebuild()?;
            self.changed |= Changed::SIGNATURE | Changed::FRAMES;
        }
        Ok(())
    }

    /// Move every slot above `entry` for its new `width`.
    fn resize(&mut self, entry: SlotEntry, width: u32) {
        let end = entry.end();
        let shift = move |slot: u32| {
            if slot >= end && !is_reserved_slot(slot) {
                slot - entry.width + width
            } else {
                slot
            }
        };
        let rewritten = self.body.insns.remap_slots(shift);
        for local in &mut self.body.locals {
            local.slot = shift(local.slot);
        }
        self.rewrote(rewritten);
    }

    /// Retype calls on `old` whose receiver was just loaded from `slot`,
    /// looking back no further than the current label or line.
    fn retype_calls(&mut self, slot: u32, old: &TypeRef, new: &TypeRef) {
        let (Some(old_owner), Some(new_owner)) = (old.internal_name(), new.internal_name()) else {
            return;
        };
        let insns = self.body.insns.as_slice();
        let calls: Vec<usize> = insns
            .iter()
            .enumerate()
            .filter(|(idx, insn)| {
                insn.call_owner() == Some(old_owner)
                    && insns[..*idx]
                        .iter()
                        .rev()
                        .take_while(|prev| !prev.is_boundary())
                        .any(|prev| prev.is_load_of(slot))
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in &calls {
            if let Some(Insn::Invoke { owner, .. }) = self.body.insns.get_mut(*idx) {
                new_owner.clone_into(owner);
            }
        }
        self.rewrote(calls.len());
    }

    /// Ask the fixer for an adapter and put it after every load of `slot`
    /// that is not immediately null-checked.
    fn insert_adapters(&mut self, slot: u32, old: &TypeRef, new: &TypeRef) {
        let Some(fixer) = self.applier.fixer else {
            return;
        };
        let Some(adapter) = fixer.adapter(slot, new, old) else {
            return;
        };
        let insns = self.body.insns.as_slice();
        let loads: Vec<usize> = insns
            .iter()
            .enumerate()
            .filter(|(idx, insn)| {
                insn.is_load_of(slot)
                    && !insns.get(idx + 1).is_some_and(Insn::is_null_check)
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in loads.iter().rev() {
            self.body.insns.insert_after(*idx, adapter.clone());
        }
        self.rewrote(loads.len());
    }

    // ── 3. Substitutions ────────────────────────────────────────────

    fn substitutions(&mut self, pairs: &[(usize, usize)]) -> Result<(), ApplyError> {
        let mut substituted = Vec::new();
        for (target, source) in substitutions_descending(pairs) {
            let source = current_index(source, &substituted);
            if target == source {
                return Err(ScriptError::SelfSubstitution {
                    op: EditOperation::Substitute { target, source },
                }
                .into());
            }
            self.entry(source)?;
            tracing::debug!(target, source, "substituting parameter");

            self.drop_parameter(target, PLACEHOLDER_SLOT)?;
            for reorder in &mut self.reorders {
                *reorder = reorder.shifted_for_removal(target);
            }
            let source = if source > target { source - 1 } else { source };
            let slot = self.entry(source)?.slot;
            let rewritten = self.body.insns.retarget(PLACEHOLDER_SLOT, slot);
            self.rewrote(rewritten);
            substituted.push(target);
        }
        Ok(())
    }

    // ── 4. Swaps and moves ──────────────────────────────────────────

    fn reorders(&mut self) -> Result<(), ApplyError> {
        let reorders = std::mem::take(&mut self.reorders);
        if reorders.is_empty() {
            return Ok(());
        }
        let len = self.body.signature.params.len();
        let out_of_range = |ordinal: usize| ApplyError::OrdinalOutOfRange { ordinal, len };

        // order[new ordinal] = old ordinal
        let mut order: Vec<usize> = (0..len).collect();
        for reorder in reorders {
            tracing::trace!(?reorder, "reordering parameters");
            match reorder {
                Reorder::Swap(a, b) => {
                    if a.max(b) >= len {
                        return Err(out_of_range(a.max(b)));
                    }
                    order.swap(a, b);
                }
                Reorder::Move { from, to } => {
                    if from.max(to) >= len {
                        return Err(out_of_range(from.max(to)));
                    }
                    let moved = order.remove(from);
                    order.insert(to, moved);
                }
            }
        }
        self.permute(&order)
    }

    fn permute(&mut self, order: &[usize]) -> Result<(), ApplyError> {
        if order.iter().enumerate().all(|(new, old)| new == *old) {
            return Ok(());
        }
        let before = self.table.clone();
        let params = &self.body.signature.params;
        let reordered: Vec<TypedParameter> = order
            .iter()
            .filter_map(|old| params.get(*old).cloned())
            .collect();
        self.body.signature.params = reordered;
        self.rebuild()?;

        let moves: FxHashMap<u32, u32> = order
            .iter()
            .enumerate()
            .filter_map(|(new, old)| Some((before.slot_of(*old)?, self.table.slot_of(new)?)))
            .filter(|(old, new)| old != new)
            .collect();
        tracing::debug!(?order, moved = moves.len(), "permuted parameters");

        let remap = |slot: u32| moves.get(&slot).copied().unwrap_or(slot);
        let rewritten = self.body.insns.remap_slots(remap);
        for local in &mut self.body.locals {
            local.slot = remap(local.slot);
        }
        self.rewrote(rewritten);
        if !moves.is_empty() {
            self.changed |= Changed::SLOTS;
        }
        self.changed |= Changed::SIGNATURE | Changed::FRAMES;
        Ok(())
    }

    // ── 5. Removals ─────────────────────────────────────────────────

    fn removals(&mut self, removals: &[usize]) -> Result<(), ApplyError> {
        for at in descending(removals) {
            let entry = self.entry(at)?;
            let uses = self.body.insns.positions_of(entry.slot);
            if self.applier.options.reject_live_removals {
                let live = self.body.insns.reachability();
                if let Some(&pos) = uses.iter().find(|&&pos| live.get(pos).copied().unwrap_or(false)) {
                    return Err(ApplyError::UnsupportedRemoval {
                        ordinal: at,
                        slot: entry.slot,
                        at: pos,
                    });
                }
            }
            tracing::debug!(at, slot = entry.slot, dead_uses = uses.len(), "removing parameter");
            self.drop_parameter(at, UNREACHABLE_SLOT)?;
        }
        Ok(())
    }

    // ── 6. Inlines ──────────────────────────────────────────────────

    fn inlines(&mut self, inlines: &[(usize, GeneratorId)]) -> Result<(), ApplyError> {
        let mut sorted = inlines.to_vec();
        sorted.sort_by(|a, b| b.0.cmp(&a.0));
        for (target, generator) in sorted {
            let entry = self.entry(target)?;
            let uses = self.body.insns.positions_of(entry.slot);
            let write = uses.iter().copied().find(|&pos| {
                matches!(
                    self.body.insns.get(pos),
                    Some(Insn::Store { .. } | Insn::Increment { .. })
                )
            });
            if let Some(at) = write {
                return Err(ApplyError::InlineWrite {
                    ordinal: target,
                    at,
                });
            }
            let replacement = if uses.is_empty() {
                Vec::new()
            } else {
                self.applier
                    .generators
                    .and_then(|generators| generators.generate(generator))
                    .ok_or(ApplyError::MissingGenerator {
                        generator,
                        ordinal: target,
                    })?
            };
            tracing::debug!(target, generator = generator.raw(), uses = uses.len(), "inlining parameter");

            self.drop_parameter(target, PLACEHOLDER_SLOT)?;
            let reads = self.body.insns.positions_of(PLACEHOLDER_SLOT);
            for pos in reads.iter().rev() {
                self.body.insns.replace_at(*pos, replacement.clone());
            }
            self.rewrote(reads.len());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
