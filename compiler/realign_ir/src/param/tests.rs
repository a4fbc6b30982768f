use pretty_assertions::assert_eq;

use super::*;

#[test]
fn named_detects_synthetic_names() {
    assert!(TypedParameter::named(TypeRef::Int, "i1").synthetic);
    assert!(!TypedParameter::named(TypeRef::Int, "count").synthetic);
}

#[test]
fn name_tie_break() {
    let declared = PositionedParameter::new(TypedParameter::named(TypeRef::Int, "count"), 0);
    let generated = PositionedParameter::new(TypedParameter::named(TypeRef::Int, "i"), 0);
    let unnamed = PositionedParameter::new(TypedParameter::new(TypeRef::Int), 1);

    assert!(!declared.same_name(&generated));
    assert!(declared.same_name(&unnamed));
    assert!(generated.same_name(&unnamed));
    assert!(!declared.matches(&generated));
    assert!(declared.matches(&unnamed));
}

#[test]
fn parse_and_render_method_descriptor() {
    let sig = MethodSignature::parse("(IJ[Ljava/lang/String;)Z", false).unwrap();
    assert_eq!(
        sig.param_types(),
        vec![
            TypeRef::Int,
            TypeRef::Long,
            TypeRef::array(TypeRef::object("java/lang/String")),
        ]
    );
    assert_eq!(sig.return_type, Some(TypeRef::Boolean));
    assert_eq!(sig.receiver_slots(), 1);
    assert_eq!(sig.descriptor(), "(IJ[Ljava/lang/String;)Z");
}

#[test]
fn parse_void_static() {
    let sig = MethodSignature::parse("()V", true).unwrap();
    assert!(sig.params.is_empty());
    assert_eq!(sig.return_type, None);
    assert_eq!(sig.receiver_slots(), 0);
    assert_eq!(sig.descriptor(), "()V");
}

#[test]
fn parse_rejects_unclosed_parameter_list() {
    assert!(matches!(
        MethodSignature::parse("(I", true),
        Err(TypeParseError::MalformedMethod { .. })
    ));
    assert!(matches!(
        MethodSignature::parse("I)V", true),
        Err(TypeParseError::MalformedMethod { .. })
    ));
}
