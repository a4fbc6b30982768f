use pretty_assertions::assert_eq;

use super::*;

#[test]
fn primitive_descriptors() {
    assert_eq!(TypeRef::Int.descriptor(), "I");
    assert_eq!(TypeRef::Long.descriptor(), "J");
    assert_eq!(TypeRef::Boolean.descriptor(), "Z");
    assert_eq!(TypeRef::Double.descriptor(), "D");
}

#[test]
fn object_and_array_descriptors() {
    let string = TypeRef::object("java/lang/String");
    assert_eq!(string.descriptor(), "Ljava/lang/String;");
    assert_eq!(
        TypeRef::array(TypeRef::array(TypeRef::Int)).descriptor(),
        "[[I"
    );
    assert_eq!(TypeRef::array(string).descriptor(), "[Ljava/lang/String;");
}

#[test]
fn parse_reads_nested_arrays() {
    assert_eq!(
        TypeRef::parse("[[Ljava/util/List;"),
        Ok(TypeRef::array(TypeRef::array(TypeRef::object(
            "java/util/List"
        ))))
    );
}

#[test]
fn parse_rejects_malformed_text() {
    assert!(matches!(
        TypeRef::parse(""),
        Err(TypeParseError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        TypeRef::parse("["),
        Err(TypeParseError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        TypeRef::parse("Q"),
        Err(TypeParseError::UnknownTag { tag: 'Q', .. })
    ));
    assert!(matches!(
        TypeRef::parse("Ljava/lang/String"),
        Err(TypeParseError::Unterminated { .. })
    ));
    assert!(matches!(
        TypeRef::parse("L;"),
        Err(TypeParseError::EmptyClassName { .. })
    ));
    assert!(matches!(
        TypeRef::parse("II"),
        Err(TypeParseError::Trailing { .. })
    ));
}

#[test]
fn display_uses_source_names() {
    assert_eq!(TypeRef::object("java/lang/String").to_string(), "java.lang.String");
    assert_eq!(TypeRef::array(TypeRef::Float).to_string(), "float[]");
}

#[test]
fn simple_name_strips_package() {
    assert_eq!(
        TypeRef::object("net/minecraft/world/item/ItemStack").simple_name(),
        Some("ItemStack")
    );
    assert_eq!(TypeRef::object("Foo").simple_name(), Some("Foo"));
    assert_eq!(TypeRef::Int.simple_name(), None);
}

#[test]
fn standard_widths() {
    assert_eq!(width_of(&TypeRef::Long), 2);
    assert_eq!(width_of(&TypeRef::Double), 2);
    assert_eq!(width_of(&TypeRef::Int), 1);
    assert_eq!(StandardWidths.width_of(&TypeRef::array(TypeRef::Long)), 1);
}

#[test]
fn reference_classification() {
    assert!(TypeRef::object("A").is_object());
    assert!(!TypeRef::array(TypeRef::Int).is_object());
    assert!(TypeRef::array(TypeRef::Int).is_reference());
    assert!(!TypeRef::Int.is_reference());
}
