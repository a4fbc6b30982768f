use pretty_assertions::assert_eq;

use crate::insn::{Insn, InsnList, LabelId};
use crate::param::{MethodSignature, TypedParameter};
use crate::types::{StandardWidths, TypeRef};

use super::*;

fn signature(is_static: bool) -> MethodSignature {
    MethodSignature::new(
        vec![
            TypedParameter::named(TypeRef::Long, "seed"),
            TypedParameter::new(TypeRef::Int),
        ],
        None,
        is_static,
    )
}

#[test]
fn parameter_locals_follow_widths() {
    let insns = InsnList::new(vec![
        Insn::Label(LabelId::new(0)),
        Insn::Return,
        Insn::Label(LabelId::new(1)),
    ]);
    let body = MethodBody::with_parameter_locals(signature(false), insns, &StandardWidths);

    let slots: Vec<(&str, u32)> = body
        .locals
        .iter()
        .map(|l| (l.name.as_str(), l.slot))
        .collect();
    assert_eq!(slots, vec![("this", 0), ("seed", 1), ("arg1", 3)]);
    assert_eq!(
        body.method_scope(),
        Scope {
            start: LabelId::new(0),
            end: LabelId::new(1),
        }
    );
}

#[test]
fn static_locals_start_at_zero() {
    let body = MethodBody::with_parameter_locals(signature(true), InsnList::default(), &StandardWidths);
    assert_eq!(body.locals[0].slot, 0);
    assert_eq!(body.locals[1].slot, 2);
}

#[test]
fn local_index_prefers_matching_name() {
    let mut body =
        MethodBody::with_parameter_locals(signature(true), InsnList::default(), &StandardWidths);
    body.locals.push(LocalVar {
        name: "shadow".to_owned(),
        ty: TypeRef::Int,
        slot: 2,
        scope: Scope::default(),
    });
    assert_eq!(body.local_index(2, Some("shadow")), Some(2));
    assert_eq!(body.local_index(2, Some("missing")), Some(1));
    assert_eq!(body.local_index(2, None), Some(1));
    assert_eq!(body.local_index(9, None), None);
}
