//! Load and save of the storage document.
//!
//! The document is an arbitrary JSON object; only the identifier keys are
//! ever rewritten, everything else passes through untouched. Loading
//! tolerates a missing or corrupt file (the caller gets an empty document
//! plus a [`LoadWarning`]); saving replaces the file through an atomic
//! temp-file rename so a failed write never leaves half a document behind.

use crate::error::ResetError;
use crate::ids;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;

/// The on-disk configuration document, keys preserved verbatim.
pub type ConfigDocument = Map<String, Value>;

/// Recoverable conditions noticed while loading.
///
/// These downgrade to a notice: the reset proceeds from an empty document
/// and the next save supersedes whatever was on disk. The corrupt file is
/// never deleted outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWarning {
    /// The file exists but does not parse as JSON.
    InvalidJson,
    /// The file parses to a JSON value that is not an object.
    NotAnObject,
}

impl LoadWarning {
    /// Human-readable notice text for the presentation layer.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidJson => "Invalid JSON in storage file, creating new configuration",
            Self::NotAnObject => {
                "Storage file does not hold a JSON object, creating new configuration"
            }
        }
    }
}

/// A loaded document plus any recoverable warning raised on the way.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    /// The parsed document; empty when the file was absent or corrupt.
    pub document: ConfigDocument,
    /// Set when the on-disk content had to be discarded.
    pub warning: Option<LoadWarning>,
}

/// Read the document at `path`.
///
/// A missing file yields an empty document with no warning. Content that is
/// not a JSON object yields an empty document plus a [`LoadWarning`].
///
/// # Errors
/// Returns [`ResetError::Read`] when an existing file cannot be read.
pub fn load(path: &Path) -> Result<LoadedConfig, ResetError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LoadedConfig::default()),
        Err(source) => {
            return Err(ResetError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(document)) => Ok(LoadedConfig {
            document,
            warning: None,
        }),
        Ok(_) => Ok(LoadedConfig {
            document: ConfigDocument::new(),
            warning: Some(LoadWarning::NotAnObject),
        }),
        Err(_) => Ok(LoadedConfig {
            document: ConfigDocument::new(),
            warning: Some(LoadWarning::InvalidJson),
        }),
    }
}

/// Write `document` to `path` as pretty-printed UTF-8 JSON.
///
/// Parent directories are created idempotently. The file is replaced via a
/// sibling temp file and rename.
///
/// # Errors
/// Returns [`ResetError::Encode`] when serialization fails and
/// [`ResetError::Save`] for any filesystem failure.
pub fn save(path: &Path, document: &ConfigDocument) -> Result<(), ResetError> {
    let save_err = |source: io::Error| ResetError::Save {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(save_err)?;
    }

    let body = serde_json::to_string_pretty(document).map_err(ResetError::Encode)? + "\n";

    let file_name = path
        .file_name()
        .map_or_else(|| "storage.json".to_string(), |n| n.to_string_lossy().into_owned());
    let tmp = path.with_file_name(format!("{file_name}.tmp.{}", ids::random_hex_id(4)?));
    fs::write(&tmp, body).map_err(save_err)?;

    // Best-effort cross-platform replacement:
    // - Unix: rename() replaces destination atomically.
    // - Windows: rename() fails if dest exists; remove then rename.
    #[cfg(windows)]
    {
        if path.exists() {
            fs::remove_file(path).map_err(save_err)?;
        }
    }

    fs::rename(&tmp, path).map_err(save_err)?;
    Ok(())
}
