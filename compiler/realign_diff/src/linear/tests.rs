use pretty_assertions::assert_eq;

use realign_ir::TypedParameter;

use super::*;

fn obj(name: &str) -> TypeRef {
    TypeRef::object(name)
}

#[test]
fn identical_lists_are_empty() {
    let types = vec![TypeRef::Int, obj("java/lang/String")];
    let diff = compare_types(&types, &types).unwrap();
    assert!(diff.is_empty());
    assert_eq!(diff.consumed, 2);
}

#[test]
fn insertion_run_before_reappearing_parameter() {
    let diff = compare_types(
        &[TypeRef::Int, TypeRef::Int],
        &[obj("Pre"), TypeRef::Int, TypeRef::Int],
    )
    .unwrap();
    assert_eq!(diff.insertions, vec![(0, obj("Pre"))]);
    assert!(diff.replacements.is_empty());
}

#[test]
fn trailing_parameters_are_appended() {
    let diff = compare_types(&[TypeRef::Int], &[TypeRef::Int, TypeRef::Long, TypeRef::Float]).unwrap();
    assert_eq!(
        diff.insertions,
        vec![(1, TypeRef::Long), (2, TypeRef::Float)]
    );
}

#[test]
fn adjacent_exchange_is_a_swap() {
    let a = obj("A");
    let b = obj("B");
    let c = obj("C");
    let diff = compare_types(&[a.clone(), b.clone(), c.clone()], &[b, a, c]).unwrap();
    assert_eq!(diff.swaps, vec![(0, 1)]);
    assert!(diff.removals.is_empty());
    assert!(diff.insertions.is_empty());
}

#[test]
fn dropped_parameter_is_removed() {
    let (a, b, c, d) = (obj("A"), obj("B"), obj("C"), obj("D"));
    let diff = compare_types(&[a.clone(), b, c.clone(), d.clone()], &[a, c, d]).unwrap();
    assert_eq!(diff.removals, vec![1]);
    assert!(diff.replacements.is_empty());
    assert_eq!(diff.into_script().ops(), &[EditOperation::Remove { at: 1 }]);
}

#[test]
fn unmatched_parameter_is_replaced() {
    let diff = compare_types(
        &[obj("EnchantmentCategory"), obj("Item")],
        &[obj("Enchantment"), obj("ItemStack")],
    )
    .unwrap();
    assert_eq!(
        diff.replacements,
        vec![(0, obj("Enchantment")), (1, obj("ItemStack"))]
    );
}

#[test]
fn generated_names_break_type_matches() {
    let reference =
        PositionedParameter::positioned(&[TypedParameter::named(TypeRef::Float, "scale")]);
    let target = PositionedParameter::positioned(&[
        TypedParameter::synthetic(TypeRef::Float, "f1"),
        TypedParameter::named(TypeRef::Float, "scale"),
    ]);
    let diff = compare(&reference, &target).unwrap();
    assert_eq!(diff.insertions, vec![(0, TypeRef::Float)]);
}

#[test]
fn script_order_is_insert_replace_swap_remove() {
    let diff = LinearDiff {
        insertions: vec![(0, TypeRef::Int)],
        replacements: vec![(2, TypeRef::Long)],
        swaps: vec![(3, 4)],
        removals: vec![1],
        consumed: 5,
    };
    assert_eq!(
        diff.into_script().to_string(),
        "[insert int at 0; replace 2 with long; swap 3 and 4; remove 1]"
    );
}
