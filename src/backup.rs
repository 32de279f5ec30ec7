use crate::error::ResetError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &str = "[year][month][day]_[hour][minute][second]";

/// Copy `path` to a timestamped sibling named
/// `<name>.backup_<YYYYMMDD_HHMMSS>`, preserving the original untouched.
///
/// A missing source is not an error: there is simply nothing to back up and
/// `Ok(None)` is returned. When a backup with the same timestamp already
/// exists (same-second rerun), a `_<n>` suffix disambiguates instead of
/// overwriting the earlier copy.
///
/// # Errors
/// Returns [`ResetError::Backup`] on any read/write/permission failure;
/// callers must treat that as terminal for the reset.
pub fn backup(path: &Path) -> Result<Option<PathBuf>, ResetError> {
    if !path.exists() {
        return Ok(None);
    }
    let backup_err = |source: io::Error| ResetError::Backup {
        path: path.to_path_buf(),
        source,
    };

    // Local wall-clock time when the offset is known, UTC otherwise.
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = time::format_description::parse(TIMESTAMP_FORMAT)
        .map_err(|err| backup_err(io::Error::other(err)))?;
    let stamp = now
        .format(&format)
        .map_err(|err| backup_err(io::Error::other(err)))?;

    let file_name = path
        .file_name()
        .map_or_else(|| "storage.json".to_string(), |n| n.to_string_lossy().into_owned());
    let mut candidate = path.with_file_name(format!("{file_name}.backup_{stamp}"));
    let mut attempt = 1_u32;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{file_name}.backup_{stamp}_{attempt}"));
        attempt = attempt.saturating_add(1);
    }

    fs::copy(path, &candidate).map_err(backup_err)?;
    Ok(Some(candidate))
}
