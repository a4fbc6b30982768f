//! Value types of parameters and locals.
//!
//! [`TypeRef`] is a structural description of a JVM-style value type. Its
//! canonical text form is the field descriptor (`I`, `J`, `Ljava/lang/String;`,
//! `[D`), which is also what the persisted edit-script format stores.
//!
//! Slot width is not a property the rest of the workspace decides on its own:
//! it is asked of a [`SlotWidths`] implementation so that hosts with a
//! different storage model can plug in their own answer.

use std::fmt;

// ── TypeRef ─────────────────────────────────────────────────────────

/// A parameter or local value type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeRef {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// A class or interface, by internal name (`java/lang/String`).
    Object(String),
    /// An array of the element type.
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Object type from an internal name.
    pub fn object(internal_name: impl Into<String>) -> Self {
        TypeRef::Object(internal_name.into())
    }

    /// Array type with the given element type.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// `true` for class/interface types. Arrays are not objects here.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Object(_))
    }

    /// `true` for anything stored by reference (objects and arrays).
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Object(_) | TypeRef::Array(_))
    }

    /// `true` for the two-slot primitives.
    #[inline]
    pub fn is_wide(&self) -> bool {
        matches!(self, TypeRef::Long | TypeRef::Double)
    }

    /// Internal name of an object type.
    pub fn internal_name(&self) -> Option<&str> {
        match self {
            TypeRef::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Last path segment of an object type's internal name.
    pub fn simple_name(&self) -> Option<&str> {
        self.internal_name()
            .map(|name| name.rsplit_once('/').map_or(name, |(_, simple)| simple))
    }

    /// Render the field descriptor.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    /// Append the field descriptor to `out`.
    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            TypeRef::Boolean => out.push('Z'),
            TypeRef::Byte => out.push('B'),
            TypeRef::Char => out.push('C'),
            TypeRef::Short => out.push('S'),
            TypeRef::Int => out.push('I'),
            TypeRef::Long => out.push('J'),
            TypeRef::Float => out.push('F'),
            TypeRef::Double => out.push('D'),
            TypeRef::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            TypeRef::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    /// Parse a complete field descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, TypeParseError> {
        let (ty, rest) = Self::parse_prefix(descriptor, descriptor)?;
        if rest.is_empty() {
            Ok(ty)
        } else {
            Err(TypeParseError::Trailing {
                input: descriptor.to_owned(),
            })
        }
    }

    /// Parse one field descriptor from the front of `text`, returning the
    /// unparsed remainder. `input` is the full text, kept for error messages.
    pub(crate) fn parse_prefix<'a>(
        text: &'a str,
        input: &str,
    ) -> Result<(Self, &'a str), TypeParseError> {
        let bytes = text.as_bytes();
        let mut idx = 0;
        while bytes.get(idx) == Some(&b'[') {
            idx += 1;
        }
        let dims = idx;

        let Some(&tag) = bytes.get(idx) else {
            return Err(TypeParseError::UnexpectedEnd {
                input: input.to_owned(),
            });
        };

        let (base, end) = match tag {
            b'Z' => (TypeRef::Boolean, idx + 1),
            b'B' => (TypeRef::Byte, idx + 1),
            b'C' => (TypeRef::Char, idx + 1),
            b'S' => (TypeRef::Short, idx + 1),
            b'I' => (TypeRef::Int, idx + 1),
            b'J' => (TypeRef::Long, idx + 1),
            b'F' => (TypeRef::Float, idx + 1),
            b'D' => (TypeRef::Double, idx + 1),
            b'L' => {
                let body = &text[idx + 1..];
                let Some(semi) = body.find(';') else {
                    return Err(TypeParseError::Unterminated {
                        input: input.to_owned(),
                    });
                };
                if semi == 0 {
                    return Err(TypeParseError::EmptyClassName {
                        input: input.to_owned(),
                    });
                }
                (TypeRef::Object(body[..semi].to_owned()), idx + semi + 2)
            }
            other => {
                return Err(TypeParseError::UnknownTag {
                    tag: char::from(other),
                    input: input.to_owned(),
                });
            }
        };

        let mut ty = base;
        for _ in 0..dims {
            ty = TypeRef::array(ty);
        }
        Ok((ty, &text[end..]))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Boolean => f.write_str("boolean"),
            TypeRef::Byte => f.write_str("byte"),
            TypeRef::Char => f.write_str("char"),
            TypeRef::Short => f.write_str("short"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Long => f.write_str("long"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::Double => f.write_str("double"),
            TypeRef::Object(name) => {
                for (i, segment) in name.split('/').enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(segment)?;
                }
                Ok(())
            }
            TypeRef::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.descriptor()
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

/// Malformed descriptor text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    #[error("descriptor `{input}` ends before a type tag")]
    UnexpectedEnd { input: String },
    #[error("unknown descriptor tag `{tag}` in `{input}`")]
    UnknownTag { tag: char, input: String },
    #[error("class name in `{input}` is missing its `;`")]
    Unterminated { input: String },
    #[error("empty class name in `{input}`")]
    EmptyClassName { input: String },
    #[error("unexpected characters after the type in `{input}`")]
    Trailing { input: String },
    #[error("malformed method descriptor `{input}`")]
    MalformedMethod { input: String },
}

// ── Slot widths ─────────────────────────────────────────────────────

/// Answers how many consecutive slots a value of a type occupies.
pub trait SlotWidths {
    /// Width in slots, 1 or 2.
    fn width_of(&self, ty: &TypeRef) -> u32;
}

/// The JVM rule: `long` and `double` take two slots, everything else one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StandardWidths;

impl SlotWidths for StandardWidths {
    #[inline]
    fn width_of(&self, ty: &TypeRef) -> u32 {
        width_of(ty)
    }
}

/// Slot width under [`StandardWidths`].
#[inline]
pub fn width_of(ty: &TypeRef) -> u32 {
    if ty.is_wide() {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests;
