//! Versioned JSON storage for edit scripts.
//!
//! A stored script looks like
//!
//! ```json
//! {"version":1,"operations":[{"op":"insert","at":1,"type":"Z"}]}
//! ```
//!
//! Operations keep script order. Types are written as field descriptors.
//! The version is checked before the operations are read, so a newer file
//! is reported as such rather than as malformed.

use std::io;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::op::EditOperation;
use crate::script::EditScript;

/// The format version this build writes and reads.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Stored<'a> {
    version: u32,
    operations: &'a [EditOperation],
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Loaded {
    #[serde(default)]
    operations: Vec<EditOperation>,
}

fn stored(script: &EditScript) -> Stored<'_> {
    Stored {
        version: FORMAT_VERSION,
        operations: script.ops(),
    }
}

fn check_version(header: &Header) -> Result<(), PersistError> {
    if header.version == FORMAT_VERSION {
        Ok(())
    } else {
        Err(PersistError::UnsupportedVersion {
            found: header.version,
            expected: FORMAT_VERSION,
        })
    }
}

pub fn to_json(script: &EditScript) -> Result<String, PersistError> {
    Ok(serde_json::to_string(&stored(script))?)
}

pub fn to_json_pretty(script: &EditScript) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&stored(script))?)
}

pub fn from_json(text: &str) -> Result<EditScript, PersistError> {
    check_version(&serde_json::from_str(text)?)?;
    let loaded: Loaded = serde_json::from_str(text)?;
    Ok(EditScript::from_ops(loaded.operations))
}

pub fn write_to<W: io::Write>(script: &EditScript, writer: W) -> Result<(), PersistError> {
    serde_json::to_writer(writer, &stored(script))?;
    Ok(())
}

/// Read a stored script. The whole input is buffered first.
pub fn read_from<R: io::Read>(mut reader: R) -> Result<EditScript, PersistError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    from_json(&text)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
