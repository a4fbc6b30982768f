//! Caller-supplied instruction sources.
//!
//! The applier never invents instructions on its own. Adapters for retyped
//! parameters and the code that stands in for an inlined parameter both
//! come from the caller through these two seams.

use rustc_hash::FxHashMap;

use realign_diff::GeneratorId;
use realign_ir::{Insn, TypeRef};

/// Supplies adapter instructions for a parameter whose type was replaced.
pub trait ReplacementFixer {
    /// Instructions to run right after each load of `slot`, turning the
    /// `actual` value now stored there into the `expected` type the
    /// surrounding code was written for. `None` leaves the loads alone.
    fn adapter(&self, slot: u32, actual: &TypeRef, expected: &TypeRef) -> Option<Vec<Insn>>;
}

/// Supplies the code that replaces reads of an inlined parameter.
pub trait InlineGenerators {
    fn generate(&self, generator: GeneratorId) -> Option<Vec<Insn>>;
}

// ── Table implementations ───────────────────────────────────────────

/// Adapters keyed by `(actual, expected)`, the same for every slot.
#[derive(Clone, Debug, Default)]
pub struct TypeAdapters {
    adapters: FxHashMap<(TypeRef, TypeRef), Vec<Insn>>,
}

impl TypeAdapters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, actual: TypeRef, expected: TypeRef, insns: Vec<Insn>) -> &mut Self {
        self.adapters.insert((actual, expected), insns);
        self
    }
}

impl ReplacementFixer for TypeAdapters {
    fn adapter(&self, _slot: u32, actual: &TypeRef, expected: &TypeRef) -> Option<Vec<Insn>> {
        self.adapters
            .get(&(actual.clone(), expected.clone()))
            .cloned()
    }
}

/// Generators registered by ID.
#[derive(Clone, Debug, Default)]
pub struct GeneratorTable {
    generators: FxHashMap<GeneratorId, Vec<Insn>>,
}

impl GeneratorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, generator: GeneratorId, insns: Vec<Insn>) -> &mut Self {
        self.generators.insert(generator, insns);
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl InlineGenerators for GeneratorTable {
    fn generate(&self, generator: GeneratorId) -> Option<Vec<Insn>> {
        self.generators.get(&generator).cloned()
    }
}
