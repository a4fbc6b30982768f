//! Parameters and method signatures.

use crate::naming::is_generated_name;
use crate::types::{TypeParseError, TypeRef};

// ── TypedParameter ──────────────────────────────────────────────────

/// One declared parameter: its type and, when known, its name.
///
/// `synthetic` marks names recognised as tool-generated. It is a tie-break
/// signal for the diff, never part of a parameter's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedParameter {
    pub ty: TypeRef,
    pub name: Option<String>,
    pub synthetic: bool,
}

impl TypedParameter {
    /// An unnamed parameter.
    pub fn new(ty: TypeRef) -> Self {
        TypedParameter {
            ty,
            name: None,
            synthetic: false,
        }
    }

    /// A named parameter; `synthetic` is derived from the name.
    pub fn named(ty: TypeRef, name: impl Into<String>) -> Self {
        let name = name.into();
        let synthetic = is_generated_name(&name, &ty);
        TypedParameter {
            ty,
            name: Some(name),
            synthetic,
        }
    }

    /// A named parameter explicitly flagged as generated.
    pub fn synthetic(ty: TypeRef, name: impl Into<String>) -> Self {
        TypedParameter {
            ty,
            name: Some(name.into()),
            synthetic: true,
        }
    }

    /// Unnamed parameters for each type.
    pub fn unnamed_all(types: &[TypeRef]) -> Vec<Self> {
        types.iter().cloned().map(TypedParameter::new).collect()
    }
}

// ── PositionedParameter ─────────────────────────────────────────────

/// A parameter together with its ordinal in the sequence it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionedParameter {
    param: TypedParameter,
    pos: usize,
}

impl PositionedParameter {
    pub fn new(param: TypedParameter, pos: usize) -> Self {
        PositionedParameter { param, pos }
    }

    /// Tag every parameter with its index.
    pub fn positioned(params: &[TypedParameter]) -> Vec<Self> {
        params
            .iter()
            .enumerate()
            .map(|(pos, param)| PositionedParameter::new(param.clone(), pos))
            .collect()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.param.ty
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.param.name.as_deref()
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.param.synthetic
    }

    pub fn param(&self) -> &TypedParameter {
        &self.param
    }

    #[inline]
    pub fn same_type(&self, other: &Self) -> bool {
        self.param.ty == other.param.ty
    }

    /// Names agree unless both are known and exactly one is synthetic.
    pub fn same_name(&self, other: &Self) -> bool {
        self.name().is_none() || other.name().is_none() || self.is_synthetic() == other.is_synthetic()
    }

    /// Same type and compatible names.
    pub fn matches(&self, other: &Self) -> bool {
        self.same_type(other) && self.same_name(other)
    }
}

// ── MethodSignature ─────────────────────────────────────────────────

/// Ordered parameters plus what decides where they live in slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub params: Vec<TypedParameter>,
    /// `None` for `void`.
    pub return_type: Option<TypeRef>,
    pub is_static: bool,
}

impl MethodSignature {
    pub fn new(params: Vec<TypedParameter>, return_type: Option<TypeRef>, is_static: bool) -> Self {
        MethodSignature {
            params,
            return_type,
            is_static,
        }
    }

    /// Build from a method descriptor such as `(ILjava/lang/String;)V`.
    /// Parameters come out unnamed.
    pub fn parse(descriptor: &str, is_static: bool) -> Result<Self, TypeParseError> {
        let malformed = || TypeParseError::MalformedMethod {
            input: descriptor.to_owned(),
        };
        let mut rest = descriptor.strip_prefix('(').ok_or_else(malformed)?;
        let mut params = Vec::new();
        while !rest.starts_with(')') {
            if rest.is_empty() {
                return Err(malformed());
            }
            let (ty, tail) = TypeRef::parse_prefix(rest, descriptor)?;
            params.push(TypedParameter::new(ty));
            rest = tail;
        }
        let ret = &rest[1..];
        let return_type = if ret == "V" {
            None
        } else {
            Some(TypeRef::parse(ret)?)
        };
        Ok(MethodSignature::new(params, return_type, is_static))
    }

    /// Slots taken by the receiver ahead of the first parameter.
    #[inline]
    pub fn receiver_slots(&self) -> u32 {
        u32::from(!self.is_static)
    }

    pub fn param_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// The method descriptor for the current parameter list.
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.ty.write_descriptor(&mut out);
        }
        out.push(')');
        match &self.return_type {
            Some(ty) => ty.write_descriptor(&mut out),
            None => out.push('V'),
        }
        out
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
