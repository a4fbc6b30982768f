use pretty_assertions::assert_eq;

use super::*;

fn obj(name: &str) -> TypeRef {
    TypeRef::object(name)
}

fn agree(script: &EditScript, types: &[TypeRef]) -> Vec<TypeRef> {
    let layered = script.replay(types).unwrap();
    let flat = script.flatten(types.len()).unwrap();
    assert_eq!(flat.replay(types).unwrap(), layered);
    layered
}

#[test]
fn insertion_keeps_its_position() {
    let mut script = EditScript::new();
    script.insert(1, TypeRef::Boolean);
    let flat = script.flatten(2).unwrap();
    assert_eq!(flat.insertions, vec![(1, TypeRef::Boolean)]);
    assert!(flat.reorders.is_empty());
}

#[test]
fn swap_flattens_to_swap() {
    let mut script = EditScript::new();
    script.swap(0, 1);
    let flat = script.flatten(2).unwrap();
    assert_eq!(flat.reorders, vec![Reorder::Swap(0, 1)]);
}

#[test]
fn rotation_flattens_to_single_move() {
    let mut script = EditScript::new();
    script.move_param(3, 0);
    let flat = script.flatten(4).unwrap();
    assert_eq!(flat.reorders, vec![Reorder::Move { from: 3, to: 0 }]);

    let types = vec![TypeRef::Int, TypeRef::Long, TypeRef::Float, TypeRef::Double];
    assert_eq!(
        agree(&script, &types),
        vec![TypeRef::Double, TypeRef::Int, TypeRef::Long, TypeRef::Float]
    );
}

#[test]
fn reorders_are_stored_against_reference_positions() {
    // Insert at 1, then move the old fourth parameter behind the sixth.
    let mut script = EditScript::new();
    script.insert(1, TypeRef::Int).move_param(4, 6);
    let flat = script.flatten(7).unwrap();
    assert_eq!(flat.insertions, vec![(1, TypeRef::Int)]);
    assert_eq!(flat.reorders, vec![Reorder::Swap(3, 4), Reorder::Swap(4, 5)]);

    let types = vec![
        obj("BlockState"),
        obj("BlockEntity"),
        obj("Block"),
        TypeRef::Boolean,
        obj("ItemStack"),
        obj("ItemStack"),
        TypeRef::Boolean,
    ];
    assert_eq!(
        agree(&script, &types),
        vec![
            obj("BlockState"),
            TypeRef::Int,
            obj("BlockEntity"),
            obj("Block"),
            obj("ItemStack"),
            obj("ItemStack"),
            TypeRef::Boolean,
            TypeRef::Boolean,
        ]
    );
}

#[test]
fn removal_after_insertion_uses_final_coordinates() {
    // [String, int, Object, float] -> [String, Object, float, double]
    let mut script = EditScript::new();
    script.remove(1).insert(3, TypeRef::Double);
    let flat = script.flatten(4).unwrap();
    assert_eq!(flat.insertions, vec![(4, TypeRef::Double)]);
    assert_eq!(flat.removals, vec![1]);

    let types = vec![obj("String"), TypeRef::Int, obj("Object"), TypeRef::Float];
    assert_eq!(
        agree(&script, &types),
        vec![obj("String"), obj("Object"), TypeRef::Float, TypeRef::Double]
    );
}

#[test]
fn replacement_of_inserted_parameter_folds_into_insertion() {
    let mut script = EditScript::new();
    script.insert(0, TypeRef::Int).replace(0, TypeRef::Long);
    let flat = script.flatten(1).unwrap();
    assert_eq!(flat.insertions, vec![(0, TypeRef::Long)]);
    assert!(flat.replacements.is_empty());
}

#[test]
fn inserted_then_removed_leaves_nothing() {
    let mut script = EditScript::new();
    script.insert(1, TypeRef::Int).remove(1);
    assert!(script.flatten(2).unwrap().is_empty());
}

#[test]
fn substitution_and_inline_coordinates() {
    let mut script = EditScript::new();
    script
        .substitute(0, 2)
        .inline(0, GeneratorId::new(7))
        .insert(0, TypeRef::Char);
    let flat = script.flatten(4).unwrap();
    assert_eq!(flat.substitutions, vec![(1, 3)]);
    assert_eq!(flat.inlines, vec![(1, GeneratorId::new(7))]);

    let types = vec![TypeRef::Int, TypeRef::Long, TypeRef::Float, TypeRef::Double];
    assert_eq!(
        agree(&script, &types),
        vec![TypeRef::Char, TypeRef::Float, TypeRef::Double]
    );
}

#[test]
fn substitution_towards_dropped_insertion_is_dangling() {
    let mut script = EditScript::new();
    script.insert(0, TypeRef::Int).substitute(1, 0).remove(0);
    assert_eq!(
        script.flatten(2),
        Err(ScriptError::DanglingSource { target: 0 })
    );
}

#[test]
fn out_of_range_is_reported() {
    let mut script = EditScript::new();
    script.remove(3);
    assert!(matches!(
        script.flatten(3),
        Err(ScriptError::IndexOutOfRange { len: 3, .. })
    ));
}

#[test]
fn offset_filters_then_shifts() {
    let flat = FlatScript {
        insertions: vec![(0, TypeRef::Int), (5, TypeRef::Long)],
        removals: vec![1, 4],
        reorders: vec![Reorder::Swap(1, 2), Reorder::Move { from: 6, to: 0 }],
        ..FlatScript::default()
    };
    let shifted = flat.offset(2, 4);
    assert_eq!(shifted.insertions, vec![(2, TypeRef::Int)]);
    assert_eq!(shifted.removals, vec![3]);
    assert_eq!(shifted.reorders, vec![Reorder::Swap(3, 4)]);
}

#[test]
fn merge_keeps_insertions_sorted() {
    let mut base = FlatScript {
        insertions: vec![(4, TypeRef::Int)],
        ..FlatScript::default()
    };
    let other = FlatScript {
        insertions: vec![(0, TypeRef::Float)],
        removals: vec![0],
        ..FlatScript::default()
    };
    base.merge(&other, 1);
    assert_eq!(base.insertions, vec![(1, TypeRef::Float), (4, TypeRef::Int)]);
    assert_eq!(base.removals, vec![1]);
    assert_eq!(base.len(), 3);
}

#[test]
fn reorder_shifts() {
    assert_eq!(Reorder::Swap(1, 3).shifted_for_insertion(2), Reorder::Swap(1, 4));
    assert_eq!(Reorder::Swap(1, 3).shifted_for_insertion(1), Reorder::Swap(2, 4));
    assert_eq!(
        Reorder::Move { from: 4, to: 1 }.shifted_for_removal(2),
        Reorder::Move { from: 3, to: 1 }
    );
}
