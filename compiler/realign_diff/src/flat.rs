//! Flat edit scripts: one list per operation kind.
//!
//! The applier cannot replay a layered script step by step, because every
//! operation kind interacts with slot bookkeeping differently. It runs the
//! kinds in a fixed order instead:
//!
//! 1. insertions, ascending
//! 2. replacements
//! 3. substitutions, descending by target
//! 4. swaps and moves, in list order
//! 5. removals, descending
//! 6. inlines, descending
//!
//! [`FlatScript`] stores each kind in the coordinates that order needs.
//! Insertions, replacements and substitutions index the list as it stands
//! once every insertion is in. Reorders index the *reference* list and are
//! shifted as insertions and substitutions land. Removals index the list
//! after reordering, inlines the list after removals.
//!
//! [`EditScript::flatten`] converts a layered script by tracking where every
//! reference parameter ends up; [`FlatScript::replay`] and
//! [`EditScript::replay`] agree on every script that flattens.

use rustc_hash::FxHashMap;

use realign_ir::TypeRef;

use crate::error::ScriptError;
use crate::op::{EditOperation, GeneratorId};
use crate::script::{step, Dropped, EditScript, Replay};

// ── Reorder ─────────────────────────────────────────────────────────

/// A pending swap or move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reorder {
    Swap(usize, usize),
    Move { from: usize, to: usize },
}

impl Reorder {
    /// Account for a parameter inserted at `at`.
    #[must_use]
    pub fn shifted_for_insertion(self, at: usize) -> Self {
        self.map(|idx| if idx >= at { idx + 1 } else { idx })
    }

    /// Account for the parameter at `at` being dropped.
    #[must_use]
    pub fn shifted_for_removal(self, at: usize) -> Self {
        self.map(|idx| if idx > at { idx - 1 } else { idx })
    }

    #[must_use]
    pub fn offset(self, delta: usize) -> Self {
        self.map(|idx| idx + delta)
    }

    fn first(self) -> usize {
        match self {
            Reorder::Swap(a, _) => a,
            Reorder::Move { from, .. } => from,
        }
    }

    fn map(self, f: impl Fn(usize) -> usize) -> Self {
        match self {
            Reorder::Swap(a, b) => Reorder::Swap(f(a), f(b)),
            Reorder::Move { from, to } => Reorder::Move {
                from: f(from),
                to: f(to),
            },
        }
    }

    fn apply<T>(self, list: &mut Vec<T>) -> bool {
        match self {
            Reorder::Swap(a, b) => {
                if a >= list.len() || b >= list.len() {
                    return false;
                }
                list.swap(a, b);
            }
            Reorder::Move { from, to } => {
                if from >= list.len() || to >= list.len() {
                    return false;
                }
                let item = list.remove(from);
                list.insert(to, item);
            }
        }
        true
    }

    fn as_op(self) -> EditOperation {
        match self {
            Reorder::Swap(a, b) => EditOperation::Swap { a, b },
            Reorder::Move { from, to } => EditOperation::Move { from, to },
        }
    }
}

// ── FlatScript ──────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatScript {
    /// Sorted by position.
    pub insertions: Vec<(usize, TypeRef)>,
    pub replacements: Vec<(usize, TypeRef)>,
    /// `(target, source)`.
    pub substitutions: Vec<(usize, usize)>,
    pub reorders: Vec<Reorder>,
    pub removals: Vec<usize>,
    pub inlines: Vec<(usize, GeneratorId)>,
}

impl FlatScript {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.insertions.len()
            + self.replacements.len()
            + self.substitutions.len()
            + self.reorders.len()
            + self.removals.len()
            + self.inlines.len()
    }

    /// Operations whose first index is below `limit`, shifted by `delta`.
    #[must_use]
    pub fn offset(&self, delta: usize, limit: usize) -> FlatScript {
        FlatScript {
            insertions: self
                .insertions
                .iter()
                .filter(|(at, _)| *at < limit)
                .map(|(at, ty)| (at + delta, ty.clone()))
                .collect(),
            replacements: self
                .replacements
                .iter()
                .filter(|(at, _)| *at < limit)
                .map(|(at, ty)| (at + delta, ty.clone()))
                .collect(),
            substitutions: self
                .substitutions
                .iter()
                .filter(|(target, _)| *target < limit)
                .map(|(target, source)| (target + delta, source + delta))
                .collect(),
            reorders: self
                .reorders
                .iter()
                .filter(|r| r.first() < limit)
                .map(|r| r.offset(delta))
                .collect(),
            removals: self
                .removals
                .iter()
                .filter(|at| **at < limit)
                .map(|at| at + delta)
                .collect(),
            inlines: self
                .inlines
                .iter()
                .filter(|(at, _)| *at < limit)
                .map(|(at, generator)| (at + delta, *generator))
                .collect(),
        }
    }

    /// Add `other`'s operations, shifted by `offset`.
    pub fn merge(&mut self, other: &FlatScript, offset: usize) {
        let shifted = other.offset(offset, usize::MAX);
        self.insertions.extend(shifted.insertions);
        self.insertions.sort_by_key(|(at, _)| *at);
        self.replacements.extend(shifted.replacements);
        self.substitutions.extend(shifted.substitutions);
        self.reorders.extend(shifted.reorders);
        self.removals.extend(shifted.removals);
        self.inlines.extend(shifted.inlines);
    }

    /// Run the script over a type list in the applier's order.
    pub fn replay(&self, types: &[TypeRef]) -> Result<Vec<TypeRef>, ScriptError> {
        let mut list = types.to_vec();
        let mut reorders = self.reorders.clone();

        let mut insertions = self.insertions.clone();
        insertions.sort_by_key(|(at, _)| *at);
        for (at, ty) in insertions {
            if at > list.len() {
                return Err(out_of_range(EditOperation::Insert { at, ty }, list.len()));
            }
            list.insert(at, ty);
            for reorder in &mut reorders {
                *reorder = reorder.shifted_for_insertion(at);
            }
        }

        for (at, ty) in &self.replacements {
            let len = list.len();
            let slot = list.get_mut(*at).ok_or_else(|| {
                out_of_range(
                    EditOperation::Replace {
                        at: *at,
                        ty: ty.clone(),
                    },
                    len,
                )
            })?;
            *slot = ty.clone();
        }

        let mut substituted: Vec<usize> = Vec::new();
        for (target, source) in substitutions_descending(&self.substitutions) {
            let source_now = current_index(source, &substituted);
            let op = EditOperation::Substitute { target, source };
            if target == source {
                return Err(ScriptError::SelfSubstitution { op });
            }
            if target >= list.len() || source_now >= list.len() {
                return Err(out_of_range(op, list.len()));
            }
            list.remove(target);
            for reorder in &mut reorders {
                *reorder = reorder.shifted_for_removal(target);
            }
            substituted.push(target);
        }

        for reorder in reorders {
            if !reorder.apply(&mut list) {
                return Err(out_of_range(reorder.as_op(), list.len()));
            }
        }

        for at in descending(&self.removals) {
            if at >= list.len() {
                return Err(out_of_range(EditOperation::Remove { at }, list.len()));
            }
            list.remove(at);
        }

        let mut inlines = self.inlines.clone();
        inlines.sort_by(|a, b| b.0.cmp(&a.0));
        for (target, generator) in inlines {
            if target >= list.len() {
                return Err(out_of_range(
                    EditOperation::Inline { target, generator },
                    list.len(),
                ));
            }
            list.remove(target);
        }

        Ok(list)
    }
}

fn out_of_range(op: EditOperation, len: usize) -> ScriptError {
    ScriptError::IndexOutOfRange { op, len }
}

/// `(target, source)` pairs ordered by descending target.
pub fn substitutions_descending(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| b.0.cmp(&a.0));
    sorted
}

/// Indices in descending order.
pub fn descending(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
}

/// Where an index taken before some removals now points.
pub fn current_index(idx: usize, removed: &[usize]) -> usize {
    idx - removed.iter().filter(|&&r| r < idx).count()
}

// ── Flattening ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Token {
    /// Reference parameter, by original ordinal.
    Ref(usize),
    /// Inserted parameter, by creation order.
    New(usize),
}

#[derive(Clone, Copy, Debug)]
enum Fate {
    Removed,
    Substituted(Token),
    Inlined(GeneratorId),
}

#[derive(Default)]
struct Tracker {
    new_types: Vec<TypeRef>,
    retyped: FxHashMap<usize, TypeRef>,
    fates: FxHashMap<usize, Fate>,
}

impl Replay<Token> for Tracker {
    fn insert(&mut self, ty: &TypeRef) -> Token {
        self.new_types.push(ty.clone());
        Token::New(self.new_types.len() - 1)
    }

    fn replace(&mut self, item: &mut Token, ty: &TypeRef) {
        match *item {
            Token::Ref(idx) => {
                self.retyped.insert(idx, ty.clone());
            }
            Token::New(idx) => self.new_types[idx] = ty.clone(),
        }
    }

    fn dropped(&mut self, item: Token, how: Dropped<Token>) {
        if let Token::Ref(idx) = item {
            let fate = match how {
                Dropped::Removed => Fate::Removed,
                Dropped::Substituted(source) => Fate::Substituted(source),
                Dropped::Inlined(generator) => Fate::Inlined(generator),
            };
            self.fates.insert(idx, fate);
        }
    }
}

/// Insert `Ref(idx)` ahead of the first reference token with a larger
/// ordinal, keeping reference tokens in ordinal order.
fn insert_in_reference_order(list: &mut Vec<Token>, idx: usize) {
    let at = list
        .iter()
        .position(|t| matches!(t, Token::Ref(other) if *other > idx))
        .unwrap_or(list.len());
    list.insert(at, Token::Ref(idx));
}

impl EditScript {
    /// The flat equivalent of this script for a reference list of
    /// `reference_len` parameters.
    pub fn flatten(&self, reference_len: usize) -> Result<FlatScript, ScriptError> {
        let mut list: Vec<Token> = (0..reference_len).map(Token::Ref).collect();
        let mut tracker = Tracker::default();
        for op in self.ops() {
            step(&mut list, op, &mut tracker)?;
        }

        // Just before removals: survivors in final order, with removed and
        // inlined parameters slotted back in by reference order.
        let mut pre_removal = list;
        for idx in 0..reference_len {
            if matches!(
                tracker.fates.get(&idx),
                Some(Fate::Removed | Fate::Inlined(_))
            ) {
                insert_in_reference_order(&mut pre_removal, idx);
            }
        }

        // Just before reordering: inserted parameters already where they
        // end up, reference parameters in reference order around them.
        let mut refs: Vec<usize> = pre_removal
            .iter()
            .filter_map(|t| match t {
                Token::Ref(idx) => Some(*idx),
                Token::New(_) => None,
            })
            .collect();
        refs.sort_unstable();
        let mut refs = refs.into_iter();
        let pre_reorder: Vec<Token> = pre_removal
            .iter()
            .map(|t| match t {
                Token::New(_) => *t,
                Token::Ref(_) => refs.next().map_or(*t, Token::Ref),
            })
            .collect();

        // Just after insertions: substituted parameters are still present.
        let mut post_insert = pre_reorder.clone();
        for idx in 0..reference_len {
            if matches!(tracker.fates.get(&idx), Some(Fate::Substituted(_))) {
                insert_in_reference_order(&mut post_insert, idx);
            }
        }
        let position_in = |list: &[Token], token: Token| list.iter().position(|t| *t == token);

        let mut flat = FlatScript::default();

        for (at, token) in post_insert.iter().enumerate() {
            match *token {
                Token::New(idx) => flat.insertions.push((at, tracker.new_types[idx].clone())),
                Token::Ref(idx) => {
                    if let (Some(ty), None) = (tracker.retyped.get(&idx), tracker.fates.get(&idx)) {
                        flat.replacements.push((at, ty.clone()));
                    }
                }
            }
        }

        for idx in (0..reference_len).rev() {
            let Some(Fate::Substituted(mut source)) = tracker.fates.get(&idx).copied() else {
                continue;
            };
            // Follow chains of substitutions to the parameter that survives.
            let mut hops = 0;
            while let Token::Ref(next) = source {
                match tracker.fates.get(&next) {
                    Some(Fate::Substituted(further)) if hops < reference_len => {
                        source = *further;
                        hops += 1;
                    }
                    _ => break,
                }
            }
            let target = position_in(&post_insert, Token::Ref(idx));
            let source = position_in(&post_insert, source);
            match (target, source) {
                (Some(target), Some(source)) if target != source => {
                    flat.substitutions.push((target, source));
                }
                _ => return Err(ScriptError::DanglingSource { target: idx }),
            }
        }

        // Reorders, computed positionally and stored against reference
        // ordinals so that insertions and substitutions can shift them.
        let reference_of: Vec<usize> = pre_reorder
            .iter()
            .map(|t| match t {
                Token::Ref(idx) => *idx,
                Token::New(_) => usize::MAX,
            })
            .collect();
        let mut current = pre_reorder;
        for k in 0..current.len() {
            if current[k] == pre_removal[k] {
                continue;
            }
            let Some(j) = (k + 1..current.len()).find(|&j| current[j] == pre_removal[k]) else {
                continue;
            };
            let contiguous = current[k..=j].iter().all(|t| matches!(t, Token::Ref(_)));
            let reorder = if pre_removal[j] != current[k] && contiguous && j - k > 1 {
                let item = current.remove(j);
                current.insert(k, item);
                Reorder::Move {
                    from: reference_of[j],
                    to: reference_of[k],
                }
            } else {
                current.swap(k, j);
                Reorder::Swap(reference_of[k], reference_of[j])
            };
            flat.reorders.push(reorder);
        }

        let mut removed = Vec::new();
        for (at, token) in pre_removal.iter().enumerate().rev() {
            if let Token::Ref(idx) = token {
                if matches!(tracker.fates.get(idx), Some(Fate::Removed)) {
                    flat.removals.push(at);
                    removed.push(at);
                }
            }
        }
        for (at, token) in pre_removal.iter().enumerate().rev() {
            if let Token::Ref(idx) = token {
                if let Some(Fate::Inlined(generator)) = tracker.fates.get(idx) {
                    flat.inlines.push((current_index(at, &removed), *generator));
                }
            }
        }

        Ok(flat)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
