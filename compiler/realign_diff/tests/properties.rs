//! Property tests for the diff engine and the two script forms.
//!
//! 1. Idempotence: diffing a list against itself yields nothing.
//! 2. Append: one appended type is exactly one insertion at the end.
//! 3. Every diff succeeds and its script replays to exactly the target.
//! 4. A layered script and its flattened form replay to the same list.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::cast_possible_truncation,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use realign_diff::{diff_types, EditOperation, EditScript, GeneratorId, ScriptError};
use realign_ir::TypeRef;

// -- Strategies --

/// A small alphabet so that repeated types are common.
fn type_strategy() -> impl Strategy<Value = TypeRef> {
    prop_oneof![
        Just(TypeRef::Int),
        Just(TypeRef::Long),
        Just(TypeRef::Boolean),
        Just(TypeRef::Double),
        Just(TypeRef::object("java/lang/String")),
        Just(TypeRef::object("java/util/List")),
        Just(TypeRef::array(TypeRef::Int)),
    ]
}

fn types_strategy(max: usize) -> impl Strategy<Value = Vec<TypeRef>> {
    prop::collection::vec(type_strategy(), 0..=max)
}

/// Raw material for one operation; turned into a valid one by [`build`].
#[derive(Clone, Debug)]
struct OpSeed {
    kind: u8,
    a: usize,
    b: usize,
    ty: TypeRef,
}

fn seed_strategy() -> impl Strategy<Value = OpSeed> {
    (0u8..7, 0usize..16, 0usize..16, type_strategy()).prop_map(|(kind, a, b, ty)| OpSeed {
        kind,
        a,
        b,
        ty,
    })
}

/// A script that replays cleanly against a list of `len` parameters.
fn build(len: usize, seeds: &[OpSeed]) -> EditScript {
    let mut script = EditScript::new();
    let mut len = len;
    for seed in seeds {
        match seed.kind {
            0 => {
                script.insert(seed.a % (len + 1), seed.ty.clone());
                len += 1;
            }
            _ if len == 0 => {}
            1 => {
                script.replace(seed.a % len, seed.ty.clone());
            }
            2 => {
                script.swap(seed.a % len, seed.b % len);
            }
            3 => {
                script.move_param(seed.a % len, seed.b % len);
            }
            4 => {
                script.remove(seed.a % len);
                len -= 1;
            }
            5 if len > 1 => {
                let target = seed.a % len;
                let mut source = seed.b % len;
                if source == target {
                    source = (target + 1) % len;
                }
                script.substitute(target, source);
                len -= 1;
            }
            6 => {
                script.inline(seed.a % len, GeneratorId::new(seed.b as u32));
                len -= 1;
            }
            _ => {}
        }
    }
    script
}

// -- Properties --

proptest! {
    #[test]
    fn diff_of_identical_lists_is_empty(types in types_strategy(10)) {
        let script = diff_types(&types, &types).unwrap();
        prop_assert!(script.is_empty(), "unexpected script {}", script);
    }

    #[test]
    fn appended_type_is_one_insertion(reference in types_strategy(10), extra in type_strategy()) {
        let mut target = reference.clone();
        target.push(extra.clone());
        let script = diff_types(&reference, &target).unwrap();
        prop_assert_eq!(
            script.ops(),
            &[EditOperation::Insert { at: reference.len(), ty: extra }]
        );
    }

    #[test]
    fn diff_replays_to_target(reference in types_strategy(8), target in types_strategy(8)) {
        let script = diff_types(&reference, &target).unwrap();
        prop_assert_eq!(script.replay(&reference).unwrap(), target);
    }

    #[test]
    fn permutation_replays_to_target(
        (reference, target) in types_strategy(8)
            .prop_flat_map(|types| (Just(types.clone()), Just(types).prop_shuffle())),
    ) {
        let script = diff_types(&reference, &target).unwrap();
        prop_assert_eq!(script.replay(&reference).unwrap(), target);
    }

    #[test]
    fn flat_and_layered_replay_agree(
        types in types_strategy(8),
        seeds in prop::collection::vec(seed_strategy(), 0..10),
    ) {
        let script = build(types.len(), &seeds);
        let layered = script.replay(&types).unwrap();
        match script.flatten(types.len()) {
            Ok(flat) => prop_assert_eq!(flat.replay(&types).unwrap(), layered),
            // A substitution redirected to an insertion the script later drops.
            Err(ScriptError::DanglingSource { .. }) => {}
            Err(err) => prop_assert!(false, "flatten failed: {}", err),
        }
    }
}
