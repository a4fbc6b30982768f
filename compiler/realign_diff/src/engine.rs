//! The parameter diff engine.
//!
//! Compares a reference parameter list against a target list and produces a
//! layered [`EditScript`]. Both lists are consumed front to back as queues:
//!
//! 1. Matching leading parameters are consumed. When the lengths differ a
//!    match is only trusted if the next pair matches too.
//! 2. A mismatch that cannot be an insertion is a replacement, and a
//!    two-parameter exchange is a swap.
//! 3. When what is left differs only by types unique to one side, those are
//!    peeled off as insertions or removals and the rest is solved as a
//!    rearrangement. Removals go first and insertions last, so moves only
//!    ever see reference parameters.
//! 4. Otherwise the smallest span that can hold the difference is cut off
//!    both queues and handed to the single-pass [`linear`] comparator.
//! 5. Target parameters left once the reference queue runs dry are inserted.
//!
//! Every pass consumes at least one reference parameter, so the loop ends.
//! Indices are read off a simulated working list that every emitted
//! operation is replayed against, which keeps the script sequential. The
//! finished script is replayed over the reference types once more and must
//! produce the target types exactly.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use realign_ir::{PositionedParameter, TypeRef, TypedParameter};

use crate::error::{DiffError, DiffProblem};
use crate::linear;
use crate::op::EditOperation;
use crate::script::{step, EditScript, Replay};

// ── Options ─────────────────────────────────────────────────────────

/// Whether generated parameter names take part in matching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NameTieBreak {
    /// On when every reference parameter has a name and at least one
    /// target parameter has a generated one.
    #[default]
    Auto,
    Always,
    Never,
}

impl NameTieBreak {
    pub fn resolve(self, reference: &[TypedParameter], target: &[TypedParameter]) -> bool {
        match self {
            NameTieBreak::Auto => {
                reference.iter().all(|p| p.name.is_some()) && target.iter().any(|p| p.synthetic)
            }
            NameTieBreak::Always => true,
            NameTieBreak::Never => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub names: NameTieBreak,
}

impl DiffOptions {
    pub fn new() -> Self {
        DiffOptions::default()
    }

    #[must_use]
    pub fn with_names(mut self, names: NameTieBreak) -> Self {
        self.names = names;
        self
    }
}

/// A script together with the problems met while computing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub script: EditScript,
    pub problems: Vec<DiffProblem>,
}

impl DiffReport {
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

// ── Entry points ────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Self {
        Differ { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// The script turning `reference` into `target`.
    pub fn diff(
        &self,
        reference: &[TypedParameter],
        target: &[TypedParameter],
    ) -> Result<EditScript, DiffError> {
        self.diff_reported(reference, target).map(|report| report.script)
    }

    /// Like [`Differ::diff`], also returning non-fatal problems.
    pub fn diff_reported(
        &self,
        reference: &[TypedParameter],
        target: &[TypedParameter],
    ) -> Result<DiffReport, DiffError> {
        let compare_names = self.options.names.resolve(reference, target);
        let mut session = Session {
            target_len: target.len(),
            same_size: reference.len() == target.len(),
            compare_names,
            working: (0..reference.len()).map(Entry::Ref).collect(),
            script: EditScript::new(),
            problems: Vec::new(),
        };
        session.run(
            PositionedParameter::positioned(reference),
            PositionedParameter::positioned(target),
        )?;
        verify(&session.script, reference, target)?;
        tracing::debug!(
            reference = reference.len(),
            target = target.len(),
            compare_names,
            operations = session.script.len(),
            problems = session.problems.len(),
            "parameter diff computed"
        );
        Ok(DiffReport {
            script: session.script,
            problems: session.problems,
        })
    }
}

/// Diff two parameter lists, comparing generated names when they carry
/// any.
pub fn diff(
    reference: &[TypedParameter],
    target: &[TypedParameter],
) -> Result<EditScript, DiffError> {
    Differ::default().diff(reference, target)
}

/// Diff two bare type lists.
pub fn diff_types(reference: &[TypeRef], target: &[TypeRef]) -> Result<EditScript, DiffError> {
    Differ::new(DiffOptions::new().with_names(NameTieBreak::Never)).diff(
        &TypedParameter::unnamed_all(reference),
        &TypedParameter::unnamed_all(target),
    )
}

// ── Session ─────────────────────────────────────────────────────────

type Queue = Vec<PositionedParameter>;

/// A working list element: a reference parameter by ordinal, or one the
/// script inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Entry {
    Ref(usize),
    New,
}

struct Track;

impl Replay<Entry> for Track {
    fn insert(&mut self, _ty: &TypeRef) -> Entry {
        Entry::New
    }

    fn replace(&mut self, _item: &mut Entry, _ty: &TypeRef) {}
}

struct Session {
    target_len: usize,
    /// Whether the inputs had equal length; fixed for the whole run.
    same_size: bool,
    compare_names: bool,
    working: Vec<Entry>,
    script: EditScript,
    problems: Vec<DiffProblem>,
}

impl Session {
    fn run(&mut self, mut clean: Queue, mut dirty: Queue) -> Result<(), DiffError> {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(table = %render_table(&clean, &dirty), "comparing parameters");
        }

        while !clean.is_empty() {
            if self.predict_match(&mut clean, &mut dirty)? {
                clean.remove(0);
                dirty.remove(0);
                continue;
            }
            if self.try_replacing(&mut clean, &mut dirty)? {
                continue;
            }
            if self.check_for_swaps(&clean, &dirty)? {
                clean.clear();
                dirty.clear();
                break;
            }
            self.compare_window(&mut clean, &mut dirty)?;
        }
        for param in &dirty {
            self.insert_at(param.pos(), param.ty())?;
        }

        if self.working.len() != self.target_len {
            return Err(DiffError::invariant(format!(
                "script yields {} parameters where the target has {}",
                self.working.len(),
                self.target_len
            )));
        }
        Ok(())
    }

    // ── Pass 1: prefix ──────────────────────────────────────────────

    /// Whether the leading pair matches. May consume extra elements and
    /// emit operations on the way; the caller still drops the leading pair
    /// when this returns `true`.
    fn predict_match(&mut self, clean: &mut Queue, dirty: &mut Queue) -> Result<bool, DiffError> {
        if self.same_size && !dirty.is_empty() {
            if !clean[0].same_type(&dirty[0]) {
                // The first reference parameter may be gone.
                if clean.len() > 2
                    && dirty.len() > 2
                    && clean[1].matches(&dirty[0])
                    && clean[2].matches(&dirty[1])
                {
                    let at = self.position(&clean[0])?;
                    self.emit(EditOperation::Remove { at })?;
                    clean.remove(0);
                    return Ok(true);
                }
                return Ok(false);
            }
            return Ok(!self.compare_names || clean[0].same_name(&dirty[0]));
        }

        if clean.len() < 2 || dirty.len() < 2 || !clean[0].same_type(&dirty[0]) {
            return Ok(false);
        }
        if clean[1].matches(&dirty[1]) {
            return Ok(true);
        }
        if self.compare_names {
            // A parameter inserted between two of the same type.
            if dirty.len() > 2 && clean[1].matches(&dirty[2]) {
                let at = self.position(&clean[0])? + 1;
                let ty = dirty[1].ty().clone();
                self.insert_at(at, &ty)?;
                clean.remove(0);
                dirty.remove(0);
                dirty.remove(0);
                return Ok(true);
            }
            return Ok(false);
        }
        self.try_moved(clean, dirty)
    }

    /// The second reference parameter, unique on both sides, moved
    /// somewhere else.
    fn try_moved(&mut self, clean: &mut Queue, dirty: &mut Queue) -> Result<bool, DiffError> {
        // With insertions or removals still pending, the target index is
        // not where the parameter ends up.
        if clean.len() != dirty.len() {
            return Ok(false);
        }
        let moved = {
            let clean_group = group_types(clean.iter());
            let dirty_group = group_types(dirty.iter());
            let ty = clean[1].ty();
            let next = dirty[1].ty();
            count(&clean_group, ty) == 1
                && count(&dirty_group, ty) == 1
                // The target's second parameter must not be an insertion.
                && count(&clean_group, next) == count(&dirty_group, next)
        };
        if !moved {
            return Ok(false);
        }
        let Some(dest) = dirty.iter().position(|p| p.same_type(&clean[1])) else {
            return Ok(false);
        };
        let from = self.position(&clean[1])?;
        self.reorder(from, dirty[dest].pos())?;
        clean.remove(1);
        dirty.remove(dest);
        Ok(true)
    }

    // ── Pass 2: replacement ─────────────────────────────────────────

    fn try_replacing(&mut self, clean: &mut Queue, dirty: &mut Queue) -> Result<bool, DiffError> {
        if self.replace_type(0, clean, dirty)? {
            return Ok(true);
        }
        if clean.len() == 2 && dirty.len() == 2 {
            if !clean[0].same_type(&clean[1])
                && clean[0].same_type(&dirty[1])
                && clean[1].same_type(&dirty[0])
            {
                let a = self.position(&clean[0])?;
                let b = self.position(&clean[1])?;
                self.emit(EditOperation::Swap { a, b })?;
                clean.clear();
                dirty.clear();
                return Ok(true);
            }
            return self.replace_type(1, clean, dirty);
        }
        Ok(false)
    }

    fn replace_type(
        &mut self,
        index: usize,
        clean: &mut Queue,
        dirty: &mut Queue,
    ) -> Result<bool, DiffError> {
        if index >= clean.len() || index >= dirty.len() {
            return Ok(false);
        }
        let next = index + 1;
        let maybe_inserted = clean.len() != dirty.len()
            && dirty.len() > next
            && clean[index].same_type(&dirty[next]);
        if maybe_inserted
            || possibly_injected(next, clean, dirty)
            || clean[index].same_type(&dirty[index])
        {
            return Ok(false);
        }
        let at = self.position(&clean[index])?;
        let ty = dirty[index].ty().clone();
        tracing::trace!(at, from = %clean[index].ty(), to = %ty, "replacing parameter");
        clean.remove(index);
        dirty.remove(index);
        self.emit(EditOperation::Replace { at, ty })?;
        Ok(true)
    }

    // ── Pass 3: rearrangement ───────────────────────────────────────

    /// Peel unique insertions or removals and solve the rest as a
    /// rearrangement. `true` when the remaining queues are fully handled.
    fn check_for_swaps(&mut self, clean: &Queue, dirty: &Queue) -> Result<bool, DiffError> {
        let clean_group = group_types(clean.iter());
        let dirty_group = group_types(dirty.iter());
        let only_clean = clean_group.keys().any(|ty| !dirty_group.contains_key(ty));
        let only_dirty = dirty_group.keys().any(|ty| !clean_group.contains_key(ty));

        let mut rest_clean: Vec<&PositionedParameter> = clean.iter().collect();
        let mut rest_dirty: Vec<&PositionedParameter> = dirty.iter().collect();
        let mut inserted = Vec::new();
        let mut removed = Vec::new();
        if !only_clean && only_dirty {
            rest_dirty.retain(|p| {
                let unique = count(&dirty_group, p.ty()) == 1 && count(&clean_group, p.ty()) == 0;
                if unique {
                    inserted.push(*p);
                }
                !unique
            });
        } else if only_clean && !only_dirty {
            rest_clean.retain(|p| {
                let unique = count(&clean_group, p.ty()) == 1 && count(&dirty_group, p.ty()) == 0;
                if unique {
                    removed.push(*p);
                }
                !unique
            });
        }

        if group_types(rest_clean.iter().copied()) != group_types(rest_dirty.iter().copied()) {
            return Ok(false);
        }

        let mut start = 0;
        while start < rest_clean.len() && rest_clean[start].same_type(rest_dirty[start]) {
            start += 1;
        }
        let mut end = rest_clean.len();
        while end > start && rest_clean[end - 1].same_type(rest_dirty[end - 1]) {
            end -= 1;
        }

        for param in removed.iter().rev() {
            let at = self.position(param)?;
            self.emit(EditOperation::Remove { at })?;
        }
        if start < end {
            self.rearrange(&rest_clean[start..end], &rest_dirty[start..end])?;
        }
        for param in &inserted {
            self.insert_at(param.pos(), param.ty())?;
        }
        Ok(true)
    }

    /// Move every type unique on both sides to its target position, in
    /// order of destination. Whatever is still out of place after that is
    /// settled front to back, taking the first parameter of the wanted type,
    /// and reported as ambiguous.
    ///
    /// Destinations are read off the working list, so the span only has to
    /// hold reference parameters.
    fn rearrange(
        &mut self,
        clean: &[&PositionedParameter],
        dirty: &[&PositionedParameter],
    ) -> Result<(), DiffError> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let owned = |list: &[&PositionedParameter]| {
                list.iter().map(|p| (*p).clone()).collect::<Vec<_>>()
            };
            tracing::trace!(
                table = %render_table(&owned(clean), &owned(dirty)),
                "rearranging parameters"
            );
        }

        let clean_group = group_types(clean.iter().copied());
        let dirty_group = group_types(dirty.iter().copied());
        let mut moves: Vec<(&PositionedParameter, usize)> = clean
            .iter()
            .filter(|p| count(&clean_group, p.ty()) == 1 && count(&dirty_group, p.ty()) == 1)
            .filter_map(|p| {
                dirty
                    .iter()
                    .position(|d| d.same_type(p))
                    .map(|to| (*p, to))
            })
            .collect();
        moves.sort_by_key(|(_, to)| *to);

        let aligned = |scratch: &[&PositionedParameter]| {
            scratch.iter().zip(dirty).all(|(c, d)| c.same_type(d))
        };
        let mut scratch: Vec<&PositionedParameter> = clean.to_vec();
        for (param, to) in moves {
            if aligned(&scratch) {
                break;
            }
            let Some(from) = scratch.iter().position(|p| p.pos() == param.pos()) else {
                continue;
            };
            if from != to {
                self.shift(&mut scratch, from, to)?;
            }
        }
        if aligned(&scratch) {
            return Ok(());
        }

        let problem = DiffProblem::AmbiguousMatch {
            reference: clean.iter().map(|p| p.ty().clone()).collect(),
            target: dirty.iter().map(|p| p.ty().clone()).collect(),
        };
        tracing::debug!(%problem, "rearranging by first match");
        self.problems.push(problem);

        for (to, wanted) in dirty.iter().enumerate() {
            if scratch.get(to).is_some_and(|p| p.same_type(wanted)) {
                continue;
            }
            let from = scratch
                .iter()
                .skip(to + 1)
                .position(|p| p.same_type(wanted))
                .map(|offset| to + 1 + offset)
                .ok_or_else(|| {
                    DiffError::invariant(format!(
                        "no reference parameter of type {} left to rearrange",
                        wanted.ty()
                    ))
                })?;
            self.shift(&mut scratch, from, to)?;
        }
        Ok(())
    }

    /// Move `scratch[from]` to where `scratch[to]` sits in the working list,
    /// and mirror that in `scratch`.
    fn shift(
        &mut self,
        scratch: &mut Vec<&PositionedParameter>,
        from: usize,
        to: usize,
    ) -> Result<(), DiffError> {
        let (Some(moved), Some(dest)) = (scratch.get(from).copied(), scratch.get(to).copied())
        else {
            return Err(DiffError::invariant(format!(
                "rearrangement index {} outside a span of {}",
                from.max(to),
                scratch.len()
            )));
        };
        let from_at = self.position(moved)?;
        let to_at = self.position(dest)?;
        self.reorder(from_at, to_at)?;
        let item = scratch.remove(from);
        scratch.insert(to, item);
        Ok(())
    }

    // ── Pass 4: windowed comparison ─────────────────────────────────

    fn compare_window(&mut self, clean: &mut Queue, dirty: &mut Queue) -> Result<(), DiffError> {
        // Where the second reference parameter shows up again bounds the
        // span that can hold an insertion.
        let ahead = if clean.len() == 1 {
            dirty.len().checked_sub(1)
        } else {
            look_ahead(dirty, &clean[1])
        };
        if let Some(ahead) = ahead {
            let matches_name = !self.compare_names
                || clean.len() < 2
                || dirty.len() < 2
                || clean[1].matches(&dirty[1]);
            let lead = if clean[0].same_type(&dirty[0]) && matches_name {
                1
            } else {
                2
            };
            let window_clean = extract(clean, if matches_name { 2 } else { 1 });
            let window_dirty = extract(dirty, ahead + lead);
            return self.compare(&window_clean, &window_dirty);
        }

        // Same length with a replaced head: compare up to the closest match.
        if clean.len() == dirty.len() {
            if let Some(closest) = find_closest_match(clean, dirty).filter(|&idx| idx > 1) {
                let window_clean = extract(clean, closest);
                let window_dirty = extract(dirty, closest);
                return self.compare(&window_clean, &window_dirty);
            }
        }

        if clean.len() > 1 {
            let dropped = clean.remove(1);
            let at = self.position(&dropped)?;
            tracing::trace!(at, ty = %dropped.ty(), "removing parameter");
            return self.emit(EditOperation::Remove { at });
        }

        Err(DiffError::invariant(format!(
            "reference parameter {} of type {} cannot be aligned with the {} remaining target parameters",
            clean[0].pos(),
            clean[0].ty(),
            dirty.len()
        )))
    }

    fn compare(
        &mut self,
        clean: &[PositionedParameter],
        dirty: &[PositionedParameter],
    ) -> Result<(), DiffError> {
        let Some(first) = clean.first() else {
            return Ok(());
        };
        let offset = self.position(first)?;
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(offset, table = %render_table(clean, dirty), "comparing window");
        }
        let window = linear::compare(clean, dirty)?;
        let consumed = window.consumed;
        for op in window.into_script().into_ops() {
            self.emit(op.offset(offset))?;
        }
        // The target window ran out first: the rest of the reference window
        // is gone.
        for param in clean.iter().skip(consumed).rev() {
            let at = self.position(param)?;
            tracing::trace!(at, ty = %param.ty(), "removing unmatched parameter");
            self.emit(EditOperation::Remove { at })?;
        }
        Ok(())
    }

    // ── Emission ────────────────────────────────────────────────────

    fn emit(&mut self, op: EditOperation) -> Result<(), DiffError> {
        step(&mut self.working, &op, &mut Track).map_err(|err| DiffError::invariant(err.to_string()))?;
        tracing::trace!(%op, "emit");
        self.script.push(op);
        Ok(())
    }

    /// Insert at a target position, or at the end if the working list is
    /// not that long yet.
    fn insert_at(&mut self, at: usize, ty: &TypeRef) -> Result<(), DiffError> {
        let at = at.min(self.working.len());
        self.emit(EditOperation::Insert { at, ty: ty.clone() })
    }

    /// Swap adjacent positions, move otherwise. A destination past the end
    /// is clamped to the last position.
    fn reorder(&mut self, from: usize, to: usize) -> Result<(), DiffError> {
        let to = to.min(self.working.len().saturating_sub(1));
        match from.abs_diff(to) {
            0 => Ok(()),
            1 => self.emit(EditOperation::Swap { a: from, b: to }),
            _ => self.emit(EditOperation::Move { from, to }),
        }
    }

    /// Current index of a reference parameter in the working list.
    fn position(&self, param: &PositionedParameter) -> Result<usize, DiffError> {
        self.working
            .iter()
            .position(|e| *e == Entry::Ref(param.pos()))
            .ok_or_else(|| {
                DiffError::invariant(format!(
                    "reference parameter {} is no longer in the working list",
                    param.pos()
                ))
            })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Replay `script` over the reference types and compare with the target.
fn verify(
    script: &EditScript,
    reference: &[TypedParameter],
    target: &[TypedParameter],
) -> Result<(), DiffError> {
    let types = |params: &[TypedParameter]| params.iter().map(|p| p.ty.clone()).collect::<Vec<_>>();
    let produced = script
        .replay(&types(reference))
        .map_err(|err| DiffError::invariant(err.to_string()))?;
    let expected = types(target);
    if produced != expected {
        return Err(DiffError::invariant(format!(
            "script {script} does not reproduce the target parameter types"
        )));
    }
    Ok(())
}

fn group_types<'a>(
    params: impl IntoIterator<Item = &'a PositionedParameter>,
) -> FxHashMap<&'a TypeRef, usize> {
    let mut group = FxHashMap::default();
    for param in params {
        *group.entry(param.ty()).or_insert(0) += 1;
    }
    group
}

#[inline]
fn count(group: &FxHashMap<&TypeRef, usize>, ty: &TypeRef) -> usize {
    group.get(ty).copied().unwrap_or(0)
}

/// Whether any pair from `from` on differs in anything, position included.
fn possibly_injected(from: usize, clean: &[PositionedParameter], dirty: &[PositionedParameter]) -> bool {
    clean
        .iter()
        .zip(dirty)
        .skip(from)
        .any(|(c, d)| c != d)
}

fn look_ahead(params: &[PositionedParameter], target: &PositionedParameter) -> Option<usize> {
    params.iter().position(|p| p.same_type(target))
}

/// Target index of the first reference parameter whose type occurs in the
/// target at all.
fn find_closest_match(clean: &[PositionedParameter], dirty: &[PositionedParameter]) -> Option<usize> {
    clean.iter().find_map(|c| look_ahead(dirty, c))
}

fn extract(queue: &mut Queue, amount: usize) -> Queue {
    let amount = amount.min(queue.len());
    queue.drain(..amount).collect()
}

/// Side-by-side view of both queues for trace output.
fn render_table(clean: &[PositionedParameter], dirty: &[PositionedParameter]) -> String {
    let rule = "=".repeat(96);
    let mut out = String::new();
    let _ = writeln!(out, "| {:>5} | {:^40} | {:^40} |", "Index", "Reference", "Target");
    let _ = writeln!(out, "{rule}");
    let cell = |list: &[PositionedParameter], i: usize| {
        list.get(i).map(|p| p.ty().to_string()).unwrap_or_default()
    };
    for i in 0..clean.len().max(dirty.len()) {
        let _ = writeln!(out, "| {:<5} | {:>40} | {:<40} |", i, cell(clean, i), cell(dirty, i));
    }
    out.push_str(&rule);
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
