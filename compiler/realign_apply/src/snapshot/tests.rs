use pretty_assertions::assert_eq;

use realign_ir::{
    Insn, InsnList, LocalVar, MethodBody, MethodSignature, Scope, StandardWidths, TypeRef,
    TypedParameter, ValueKind, UNREACHABLE_SLOT,
};

use super::*;

fn local(name: &str, ty: TypeRef, slot: u32) -> LocalVar {
    LocalVar {
        name: name.to_owned(),
        ty,
        slot,
        scope: Scope::default(),
    }
}

fn load(slot: u32, kind: ValueKind) -> Insn {
    Insn::Load { slot, kind }
}

fn slots(body: &MethodBody) -> Vec<(String, u32)> {
    body.locals
        .iter()
        .map(|local| (local.name.clone(), local.slot))
        .collect()
}

fn string() -> TypeRef {
    TypeRef::object("java/lang/String")
}

#[test]
fn added_local_pushes_later_slots_up() {
    let signature = MethodSignature::new(
        vec![
            TypedParameter::named(TypeRef::Int, "count"),
            TypedParameter::named(string(), "label"),
        ],
        None,
        false,
    );
    let mut body = MethodBody::new(
        signature,
        vec![
            local("this", TypeRef::object("Owner"), 0),
            local("count", TypeRef::Int, 1),
            local("label", string(), 2),
            local("tmp", string(), 3),
        ],
        InsnList::new(vec![
            load(1, ValueKind::Int),
            load(2, ValueKind::Reference),
            load(3, ValueKind::Reference),
            Insn::Store {
                slot: 3,
                kind: ValueKind::Reference,
            },
        ]),
    );

    let snapshot = SlotSnapshot::take(&body, &StandardWidths);
    assert_eq!(snapshot.referenced_slots(), &[1, 2, 3]);
    body.locals
        .insert(2, local("injected_1", TypeRef::Boolean, 2));
    let rewritten = snapshot.reconcile(&mut body, &StandardWidths);

    assert_eq!(rewritten, 3);
    assert_eq!(
        slots(&body),
        vec![
            ("this".to_owned(), 0),
            ("count".to_owned(), 1),
            ("injected_1".to_owned(), 2),
            ("label".to_owned(), 3),
            ("tmp".to_owned(), 4),
        ]
    );
    assert_eq!(
        body.insns.as_slice(),
        &[
            load(1, ValueKind::Int),
            load(3, ValueKind::Reference),
            load(4, ValueKind::Reference),
            Insn::Store {
                slot: 4,
                kind: ValueKind::Reference,
            },
        ]
    );
}

#[test]
fn dropped_wide_local_pulls_later_slots_down() {
    let mut body = MethodBody::new(
        MethodSignature::parse("(IJLjava/lang/String;)V", true).unwrap(),
        vec![
            local("a", TypeRef::Int, 0),
            local("b", TypeRef::Long, 1),
            local("c", string(), 3),
            local("x", TypeRef::Int, 4),
        ],
        InsnList::new(vec![
            load(0, ValueKind::Int),
            load(1, ValueKind::Long),
            load(3, ValueKind::Reference),
            Insn::Store {
                slot: 4,
                kind: ValueKind::Int,
            },
        ]),
    );

    let snapshot = SlotSnapshot::take(&body, &StandardWidths);
    body.insns.retarget(1, UNREACHABLE_SLOT);
    body.locals.remove(1);
    let rewritten = snapshot.reconcile(&mut body, &StandardWidths);

    assert_eq!(rewritten, 2);
    assert_eq!(
        slots(&body),
        vec![
            ("a".to_owned(), 0),
            ("c".to_owned(), 1),
            ("x".to_owned(), 2),
        ]
    );
    assert_eq!(
        body.insns.as_slice(),
        &[
            load(0, ValueKind::Int),
            load(UNREACHABLE_SLOT, ValueKind::Long),
            load(1, ValueKind::Reference),
            Insn::Store {
                slot: 2,
                kind: ValueKind::Int,
            },
        ]
    );
}

#[test]
fn unchanged_body_is_left_alone() {
    let mut body = MethodBody::new(
        MethodSignature::parse("(I)V", true).unwrap(),
        vec![local("a", TypeRef::Int, 0)],
        InsnList::new(vec![load(0, ValueKind::Int), Insn::Return]),
    );
    let before = body.clone();
    let snapshot = SlotSnapshot::take(&body, &StandardWidths);
    assert_eq!(snapshot.reconcile(&mut body, &StandardWidths), 0);
    assert_eq!(body, before);
}

#[test]
fn added_local_shifts_older_local_of_same_name() {
    let mut body = MethodBody::new(
        MethodSignature::parse("(ILjava/lang/String;)V", true).unwrap(),
        vec![
            local("count", TypeRef::Int, 0),
            local("label", string(), 1),
            local("injected_1", string(), 2),
        ],
        InsnList::new(vec![
            load(1, ValueKind::Reference),
            Insn::Store {
                slot: 2,
                kind: ValueKind::Reference,
            },
        ]),
    );

    let snapshot = SlotSnapshot::take(&body, &StandardWidths);
    body.locals.insert(1, local("injected_1", TypeRef::Boolean, 1));
    let rewritten = snapshot.reconcile(&mut body, &StandardWidths);

    assert_eq!(rewritten, 2);
    assert_eq!(
        slots(&body),
        vec![
            ("count".to_owned(), 0),
            ("injected_1".to_owned(), 1),
            ("label".to_owned(), 2),
            ("injected_1".to_owned(), 3),
        ]
    );
    assert_eq!(
        body.insns.as_slice(),
        &[
            load(2, ValueKind::Reference),
            Insn::Store {
                slot: 3,
                kind: ValueKind::Reference,
            },
        ]
    );
}
