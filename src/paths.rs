use crate::error::ResetError;
use std::path::{Path, PathBuf};

fn storage_file_under(root: &Path) -> PathBuf {
    root.join("Windsurf")
        .join("User")
        .join("globalStorage")
        .join("storage.json")
}

/// Compute the configuration root for the given OS identifier.
///
/// `appdata` is the value of the Windows `APPDATA` variable; `home` is the
/// user's home directory (macOS and Linux). Inputs are parameters so every
/// platform branch is testable on any host; only [`storage_file`] reads the
/// process environment.
fn config_root_for(
    os: &str,
    appdata: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ResetError> {
    match os {
        "windows" => appdata.ok_or_else(|| ResetError::PathUnavailable {
            path: PathBuf::from("%APPDATA%"),
            source: None,
        }),
        "macos" => home
            .map(|home| home.join("Library").join("Application Support"))
            .ok_or_else(unknown_home),
        "linux" => home.map(|home| home.join(".config")).ok_or_else(unknown_home),
        other => Err(ResetError::UnsupportedPlatform {
            os: other.to_string(),
        }),
    }
}

fn unknown_home() -> ResetError {
    ResetError::PathUnavailable {
        path: PathBuf::from("~"),
        source: None,
    }
}

/// Reject a configuration root that is missing or not writable, so callers
/// fail before any write is attempted deep inside the workflow.
///
/// Writability is checked with an anonymous temp file probe; permission bits
/// alone are unreliable across platforms.
fn ensure_root_usable(root: &Path) -> Result<(), ResetError> {
    if !root.is_dir() {
        return Err(ResetError::PathUnavailable {
            path: root.to_path_buf(),
            source: None,
        });
    }
    tempfile::tempfile_in(root).map_err(|source| ResetError::PathUnavailable {
        path: root.to_path_buf(),
        source: Some(source),
    })?;
    Ok(())
}

fn storage_file_for(
    os: &str,
    appdata: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ResetError> {
    let root = config_root_for(os, appdata, home)?;
    ensure_root_usable(&root)?;
    Ok(storage_file_under(&root))
}

/// Resolve the storage file location for the current host.
///
/// # Errors
/// Returns [`ResetError::UnsupportedPlatform`] for unknown operating systems
/// and [`ResetError::PathUnavailable`] when the base directory is absent or
/// not writable.
pub fn storage_file() -> Result<PathBuf, ResetError> {
    storage_file_for(
        std::env::consts::OS,
        std::env::var_os("APPDATA").map(PathBuf::from),
        dirs::home_dir(),
    )
}
