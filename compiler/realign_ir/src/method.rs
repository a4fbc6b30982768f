//! Method bodies: signature, declared locals and instructions.

use crate::insn::{InsnList, LabelId};
use crate::param::MethodSignature;
use crate::types::{SlotWidths, TypeRef};

/// Label range a local is declared over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub start: LabelId,
    pub end: LabelId,
}

/// One entry of the declared local-variable table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalVar {
    pub name: String,
    pub ty: TypeRef,
    pub slot: u32,
    pub scope: Scope,
}

/// Everything the applier rewrites, owned together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodBody {
    pub signature: MethodSignature,
    pub locals: Vec<LocalVar>,
    pub insns: InsnList,
}

impl MethodBody {
    pub fn new(signature: MethodSignature, locals: Vec<LocalVar>, insns: InsnList) -> Self {
        MethodBody {
            signature,
            locals,
            insns,
        }
    }

    /// A body whose local table declares the receiver (for instance
    /// methods) and every parameter over the whole method. Unnamed
    /// parameters are called `arg<ordinal>`.
    pub fn with_parameter_locals(
        signature: MethodSignature,
        insns: InsnList,
        widths: &dyn SlotWidths,
    ) -> Self {
        let scope = insns
            .outer_labels()
            .map(|(start, end)| Scope { start, end })
            .unwrap_or_default();
        let mut locals = Vec::with_capacity(signature.params.len() + 1);
        let mut slot = 0;
        if !signature.is_static {
            locals.push(LocalVar {
                name: "this".to_owned(),
                ty: TypeRef::object("java/lang/Object"),
                slot,
                scope,
            });
            slot += 1;
        }
        for (ordinal, param) in signature.params.iter().enumerate() {
            let name = param
                .name
                .clone()
                .unwrap_or_else(|| format!("arg{ordinal}"));
            locals.push(LocalVar {
                name,
                ty: param.ty.clone(),
                slot,
                scope,
            });
            slot += widths.width_of(&param.ty);
        }
        MethodBody::new(signature, locals, insns)
    }

    /// The scope new parameter locals are declared over: that of the
    /// local at slot 0 when there is one, else the outermost labels.
    pub fn method_scope(&self) -> Scope {
        self.locals
            .iter()
            .find(|local| local.slot == 0)
            .map(|local| local.scope)
            .or_else(|| {
                self.insns
                    .outer_labels()
                    .map(|(start, end)| Scope { start, end })
            })
            .unwrap_or_default()
    }

    /// Index into `locals` of the local declared at `slot`, preferring one
    /// named `name` when several share the slot.
    pub fn local_index(&self, slot: u32, name: Option<&str>) -> Option<usize> {
        let mut fallback = None;
        for (idx, local) in self.locals.iter().enumerate() {
            if local.slot != slot {
                continue;
            }
            if name.is_none() || name == Some(local.name.as_str()) {
                return Some(idx);
            }
            fallback.get_or_insert(idx);
        }
        fallback
    }
}

#[cfg(test)]
mod tests;
