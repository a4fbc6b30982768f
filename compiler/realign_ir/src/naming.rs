//! Recognition of mechanically generated parameter names.
//!
//! Decompilers and mapping tools name parameters they know nothing about
//! after a fixed scheme: a per-type stem followed by an optional counter
//! (`i`, `j1`, `flag2`, `s`), a mapping prefix (`p_12345_`), an obfuscated
//! placeholder (`$$3`), or the lower-cased class name (`itemstack1`).
//! Such names carry no author intent, so the diff engine treats them as a
//! separate class from declared names when breaking ties.

use crate::TypeRef;

const MAPPING_PREFIX: &str = "p_";

/// Generated-name stems for one group of types.
struct Stems {
    matches: fn(&TypeRef) -> bool,
    stems: &'static [&'static str],
}

fn object_named(ty: &TypeRef, name: &str) -> bool {
    ty.internal_name() == Some(name)
}

static STEMS: &[Stems] = &[
    Stems {
        matches: |ty| matches!(ty, TypeRef::Int | TypeRef::Long),
        stems: &["i", "j", "k", "l"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Byte),
        stems: &["b"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Char),
        stems: &["c"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Short),
        stems: &["short"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Boolean),
        stems: &["flag", "bl"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Double),
        stems: &["d"],
    },
    Stems {
        matches: |ty| matches!(ty, TypeRef::Float),
        stems: &["f"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/io/File"),
        stems: &["file"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/String"),
        stems: &["s"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Class"),
        stems: &["oclass"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Long"),
        stems: &["olong"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Byte"),
        stems: &["obyte"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Short"),
        stems: &["oshort"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Boolean"),
        stems: &["obool"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Package"),
        stems: &["opackage"],
    },
    Stems {
        matches: |ty| object_named(ty, "java/lang/Enum"),
        stems: &["oenum"],
    },
];

fn stems_for(ty: &TypeRef) -> Option<&'static [&'static str]> {
    STEMS
        .iter()
        .find(|entry| (entry.matches)(ty))
        .map(|entry| entry.stems)
}

/// If `name` is `stem` followed by only ASCII digits, the digit suffix.
fn counter_after<'a>(name: &'a str, stem: &str) -> Option<&'a str> {
    name.strip_prefix(stem)
        .filter(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
}

fn is_obfuscated(name: &str) -> bool {
    name.strip_prefix("$$")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `name` looks machine-generated for a value of type `ty`.
pub fn is_generated_name(name: &str, ty: &TypeRef) -> bool {
    if name.starts_with(MAPPING_PREFIX) || is_obfuscated(name) {
        return true;
    }
    if let Some(stems) = stems_for(ty) {
        if stems.iter().any(|stem| counter_after(name, stem).is_some()) {
            return true;
        }
    }
    if name == "this" {
        return false;
    }
    match ty.simple_name() {
        Some(simple) => {
            let lowered = simple.to_lowercase();
            counter_after(name, &lowered).is_some()
        }
        None => false,
    }
}

/// The counter of a stem-generated name (`j3` → 3, `flag` → 0).
///
/// Only the per-type stems carry an ordinal; class-name derived and mapping
/// names return `None`.
pub fn generated_ordinal(name: &str, ty: &TypeRef) -> Option<u32> {
    let stems = stems_for(ty)?;
    stems.iter().find_map(|stem| {
        let digits = counter_after(name, stem)?;
        if digits.is_empty() {
            Some(0)
        } else {
            digits.parse().ok()
        }
    })
}
