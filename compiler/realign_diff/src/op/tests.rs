use pretty_assertions::assert_eq;

use super::*;

#[test]
fn offset_shifts_every_index() {
    assert_eq!(
        EditOperation::Swap { a: 1, b: 2 }.offset(3),
        EditOperation::Swap { a: 4, b: 5 }
    );
    assert_eq!(
        EditOperation::Substitute {
            target: 0,
            source: 2
        }
        .offset(1),
        EditOperation::Substitute {
            target: 1,
            source: 3
        }
    );
}

#[test]
fn offset_keeps_replacement_kind() {
    let replace = EditOperation::Replace {
        at: 2,
        ty: TypeRef::Float,
    };
    assert_eq!(
        replace.offset(1),
        EditOperation::Replace {
            at: 3,
            ty: TypeRef::Float
        }
    );
}

#[test]
fn within_limit_checks_primary_index() {
    assert!(EditOperation::Move { from: 1, to: 9 }.within_limit(2));
    assert!(!EditOperation::Move { from: 2, to: 0 }.within_limit(2));
    assert!(EditOperation::Remove { at: 0 }.within_limit(1));
    assert!(!EditOperation::Inline {
        target: 4,
        generator: GeneratorId::new(0)
    }
    .within_limit(4));
}

#[test]
fn display_is_readable() {
    assert_eq!(
        EditOperation::Insert {
            at: 1,
            ty: TypeRef::object("java/lang/String")
        }
        .to_string(),
        "insert java.lang.String at 1"
    );
    assert_eq!(EditOperation::Swap { a: 0, b: 1 }.to_string(), "swap 0 and 1");
}
