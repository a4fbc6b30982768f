use pretty_assertions::assert_eq;

use super::*;

fn load(slot: u32) -> Insn {
    Insn::Load {
        slot,
        kind: ValueKind::Int,
    }
}

fn label(n: u32) -> Insn {
    Insn::Label(LabelId::new(n))
}

#[test]
fn slot_view_covers_locals_only() {
    let mut store = Insn::Store {
        slot: 3,
        kind: ValueKind::Long,
    };
    assert_eq!(store.slot(), Some(3));
    assert!(store.set_slot(5));
    assert_eq!(store.slot(), Some(5));

    let mut ret = Insn::Return;
    assert_eq!(ret.slot(), None);
    assert!(!ret.set_slot(1));
}

#[test]
fn referenced_slots_are_sorted_unique_and_skip_reserved() {
    let list = InsnList::new(vec![
        load(4),
        load(1),
        Insn::Increment { slot: 4, delta: 1 },
        load(PLACEHOLDER_SLOT),
        load(UNREACHABLE_SLOT),
        Insn::Return,
    ]);
    assert_eq!(list.referenced_slots().as_slice(), &[1, 4]);
}

#[test]
fn retarget_rewrites_matching_operands() {
    let mut list = InsnList::new(vec![load(1), load(2), load(1)]);
    assert_eq!(list.retarget(1, 7), 2);
    assert_eq!(list.as_slice(), &[load(7), load(2), load(7)]);
}

#[test]
fn insert_after_and_replace_at() {
    let mut list = InsnList::new(vec![load(1), Insn::Return]);
    list.insert_after(0, vec![Insn::Const(9)]);
    assert_eq!(list.as_slice(), &[load(1), Insn::Const(9), Insn::Return]);

    list.replace_at(0, vec![Insn::Const(1), Insn::Const(2)]);
    assert_eq!(
        list.as_slice(),
        &[Insn::Const(1), Insn::Const(2), Insn::Const(9), Insn::Return]
    );
}

#[test]
fn reachability_resets_at_labels() {
    let list = InsnList::new(vec![
        load(1),
        Insn::Return,
        load(2),
        label(1),
        load(3),
        Insn::Jump(LabelId::new(1)),
        load(4),
    ]);
    assert_eq!(
        list.reachability(),
        vec![true, true, false, true, true, true, false]
    );
}

#[test]
fn outer_labels_span_method() {
    let list = InsnList::new(vec![label(0), load(1), label(3), Insn::Return, label(7)]);
    assert_eq!(list.outer_labels(), Some((LabelId::new(0), LabelId::new(7))));
    assert_eq!(InsnList::default().outer_labels(), None);
}

#[test]
fn null_checks_and_boundaries() {
    assert!(Insn::Branch {
        kind: BranchKind::IfNull,
        target: LabelId::new(0),
    }
    .is_null_check());
    assert!(!Insn::Branch {
        kind: BranchKind::Conditional,
        target: LabelId::new(0),
    }
    .is_null_check());
    assert!(Insn::Line(3).is_boundary());
    assert!(label(0).is_boundary());
    assert!(!load(0).is_boundary());
}

#[test]
fn value_kinds() {
    assert_eq!(ValueKind::of(&TypeRef::Boolean), ValueKind::Int);
    assert_eq!(ValueKind::of(&TypeRef::Double), ValueKind::Double);
    assert_eq!(
        ValueKind::of(&TypeRef::array(TypeRef::Int)),
        ValueKind::Reference
    );
}
