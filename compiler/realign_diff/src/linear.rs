//! Single-pass parameter comparison.
//!
//! Walks both lists with one cursor each and classifies every mismatch as a
//! swap, an insertion run, a removal or a replacement. It has no notion of
//! moves and gives up on anything a one-element lookahead cannot explain,
//! which is why the diff engine only hands it small windows.

use realign_ir::{PositionedParameter, TypeRef};

use crate::error::DiffError;
use crate::op::EditOperation;
use crate::script::EditScript;

/// What a single pass found.
///
/// Insertions, replacements and swaps index the reference list with the
/// insertions already in place. Removals are sequential: each one indexes
/// the list left by the removals before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearDiff {
    pub insertions: Vec<(usize, TypeRef)>,
    pub replacements: Vec<(usize, TypeRef)>,
    pub swaps: Vec<(usize, usize)>,
    pub removals: Vec<usize>,
    /// Reference parameters the pass accounted for.
    pub consumed: usize,
}

impl LinearDiff {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
            && self.replacements.is_empty()
            && self.swaps.is_empty()
            && self.removals.is_empty()
    }

    /// The layered equivalent: insertions, replacements, swaps, removals.
    pub fn into_script(self) -> EditScript {
        let insertions = self
            .insertions
            .into_iter()
            .map(|(at, ty)| EditOperation::Insert { at, ty });
        let replacements = self
            .replacements
            .into_iter()
            .map(|(at, ty)| EditOperation::Replace { at, ty });
        let swaps = self
            .swaps
            .into_iter()
            .map(|(a, b)| EditOperation::Swap { a, b });
        let removals = self
            .removals
            .into_iter()
            .map(|at| EditOperation::Remove { at });
        insertions
            .chain(replacements)
            .chain(swaps)
            .chain(removals)
            .collect()
    }
}

/// Type plus generated-name flag; the identity this pass compares by.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Param<'a> {
    ty: &'a TypeRef,
    generated: bool,
}

impl<'a> Param<'a> {
    fn of(param: &'a PositionedParameter) -> Self {
        Param {
            ty: param.ty(),
            generated: param.is_synthetic(),
        }
    }

    fn bare(ty: &'a TypeRef) -> Self {
        Param {
            ty,
            generated: false,
        }
    }

    #[inline]
    fn match_name(self, other: Self) -> bool {
        self.generated == other.generated
    }
}

/// Compare two parameter lists in one pass.
pub fn compare(
    reference: &[PositionedParameter],
    target: &[PositionedParameter],
) -> Result<LinearDiff, DiffError> {
    let clean: Vec<Param<'_>> = reference.iter().map(Param::of).collect();
    let dirty: Vec<Param<'_>> = target.iter().map(Param::of).collect();
    run(&clean, &dirty)
}

/// Compare two bare type lists in one pass.
pub fn compare_types(reference: &[TypeRef], target: &[TypeRef]) -> Result<LinearDiff, DiffError> {
    let clean: Vec<Param<'_>> = reference.iter().map(Param::bare).collect();
    let dirty: Vec<Param<'_>> = target.iter().map(Param::bare).collect();
    run(&clean, &dirty)
}

fn run(clean: &[Param<'_>], dirty: &[Param<'_>]) -> Result<LinearDiff, DiffError> {
    let mut out = LinearDiff::default();
    let mut i = 0;
    let mut j = 0;
    // Position in the reference list with insertions applied.
    let mut at = 0;

    'outer: while j < dirty.len() {
        let mut hold_target = false;
        if i < clean.len() {
            let old = clean[i];
            let new = dirty[j];
            let same_type = old.ty == new.ty;
            if !same_type || !old.match_name(new) {
                let mut handled = false;
                let mut removing = false;
                if i + 1 < clean.len() && j + 1 < dirty.len() {
                    let next_old = clean[i + 1];
                    let next_new = dirty[j + 1];
                    if next_old.ty == new.ty && next_new == old {
                        out.swaps.push((at, at + 1));
                        i += 1;
                        at += 1;
                        j += 1;
                        handled = true;
                    }
                    // Removal when the following two line up again. The
                    // second check indexes the reference list by the target
                    // cursor.
                    if next_old == new && (j + 2 >= clean.len() || clean[j + 2] == next_new) {
                        removing = true;
                    }
                }
                if !handled {
                    // The reference parameter may reappear further ahead,
                    // everything before it then is inserted.
                    for k in j + 1..dirty.len() {
                        let ahead = dirty[k];
                        if old.ty == ahead.ty && (same_type || old.match_name(ahead)) {
                            while j < k {
                                out.insertions.push((at, dirty[j].ty.clone()));
                                j += 1;
                                at += 1;
                            }
                            continue 'outer;
                        }
                    }
                    if removing {
                        out.removals.push(j);
                        hold_target = true;
                    } else if !same_type {
                        out.replacements.push((at, new.ty.clone()));
                    }
                }
            }
            i += 1;
            at += 1;
        } else {
            out.insertions.push((at, dirty[j].ty.clone()));
            at += 1;
        }
        if !hold_target {
            j += 1;
        }
    }

    // consumed target - consumed reference + removals == insertions
    if j + out.removals.len() != i + out.insertions.len() {
        return Err(DiffError::invariant(format!(
            "single-pass comparison consumed {j} target and {i} reference parameters \
             with {} removals but recorded {} insertions",
            out.removals.len(),
            out.insertions.len()
        )));
    }
    out.consumed = i;
    tracing::trace!(
        insertions = out.insertions.len(),
        replacements = out.replacements.len(),
        swaps = out.swaps.len(),
        removals = out.removals.len(),
        "single-pass comparison"
    );
    Ok(out)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
