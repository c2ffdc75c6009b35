//! Strict decoding of the YAML/JSON documents the core loads at startup.
//!
//! Both the condition catalog and the doctor directory are read through here so schema errors
//! carry the same `<what> schema mismatch at <path>` shape regardless of format.

use crate::{TriageError, TriageResult};
use serde::de::DeserializeOwned;
use std::path::Path;

/// On-disk encoding of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are decoded as JSON; anything else as YAML.
    pub(crate) fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Read a document from disk.
pub(crate) fn read(path: &Path) -> TriageResult<String> {
    std::fs::read_to_string(path).map_err(|source| TriageError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode `text` into the wire type `T`.
///
/// `what` names the document in error messages (for example `"catalog"`).
pub(crate) fn decode<T: DeserializeOwned>(
    text: &str,
    format: DocumentFormat,
    what: &str,
) -> TriageResult<T> {
    let (path, source) = match format {
        DocumentFormat::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_str(text);
            match serde_path_to_error::deserialize::<_, T>(deserializer) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => (err.path().to_string(), err.into_inner().to_string()),
            }
        }
        DocumentFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => (err.path().to_string(), err.into_inner().to_string()),
            }
        }
    };

    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    Err(TriageError::Schema(format!(
        "{what} schema mismatch at {path}: {source}"
    )))
}
