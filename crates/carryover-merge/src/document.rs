//! Reading and writing JSON documents.
//!
//! Output uses four-space indentation so merged files diff cleanly against
//! hand-maintained ones.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{MergeError, MergeResult};

const INDENT: &[u8] = b"    ";

/// Read and parse a UTF-8 JSON document.
pub fn read_document(path: &Path) -> MergeResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| MergeError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Render `value` as JSON indented with four spaces.
pub fn to_pretty_json(value: &Value) -> MergeResult<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|e| MergeError::Serialization(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| MergeError::Serialization(e.to_string()))
}

/// Write `value` to `path`. The document is fully rendered before the file
/// is touched.
pub fn write_document(path: &Path, value: &Value) -> MergeResult<()> {
    let text = to_pretty_json(value)?;
    std::fs::write(path, text).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
