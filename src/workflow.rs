//! The reset and view operations.
//!
//! Both run as a single synchronous pass with no retries. The terminal is
//! only reached through the injected [`ConsoleUi`] collaborator, so the
//! logic here stays testable with a scripted stand-in.

use crate::backup;
use crate::config::{self, ConfigDocument};
use crate::error::ResetError;
use crate::ids::DeviceIdSet;
use crate::paths;
use crate::ui::{ConsoleUi, Notice};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Whether to copy the storage file before overwriting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupChoice {
    /// Ask the collaborator when the file exists.
    Ask,
    /// Back up without asking.
    Always,
    /// Skip the backup without asking.
    Never,
}

/// Inputs for one reset invocation.
#[derive(Debug, Clone)]
pub struct ResetParams {
    /// Explicit storage file location; resolved per OS when absent.
    pub storage_file: Option<PathBuf>,
    /// Backup decision, or [`BackupChoice::Ask`] to defer to the user.
    pub backup: BackupChoice,
}

/// What a successful reset produced.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    /// The storage file that was written.
    pub storage_file: PathBuf,
    /// The backup copy, when one was made.
    pub backup_file: Option<PathBuf>,
    /// The freshly generated identifiers now stored in the document.
    pub ids: DeviceIdSet,
}

/// Resolve the storage file, honoring an explicit override verbatim.
///
/// # Errors
/// Propagates [`paths::storage_file`] failures when no override is given.
pub fn resolve_storage_file(override_path: Option<PathBuf>) -> Result<PathBuf, ResetError> {
    match override_path {
        Some(path) => Ok(path),
        None => paths::storage_file(),
    }
}

/// Run the reset workflow: resolve, offer a backup, load, generate, merge,
/// save, report.
///
/// Unrelated keys in the document are preserved unchanged; a corrupt
/// document downgrades to a warning notice and an empty start.
///
/// # Errors
/// Any [`ResetError`] is terminal for this invocation, including a failed
/// backup attempt and a cancelled prompt.
pub fn run_reset(
    ui: &mut dyn ConsoleUi,
    params: ResetParams,
) -> Result<ResetOutcome, ResetError> {
    ui.step("Locating storage file...")?;
    let storage_file = resolve_storage_file(params.storage_file)?;

    let backup_file = offer_backup(ui, &storage_file, params.backup)?;

    ui.step("Loading configuration...")?;
    let loaded = config::load(&storage_file)?;
    if let Some(warning) = loaded.warning {
        ui.notice(Notice::Warning, warning.message())?;
    }
    let mut document = loaded.document;

    ui.step("Generating new device IDs...")?;
    let ids = DeviceIdSet::generate()?;
    merge_ids(&mut document, &ids);

    ui.step("Saving configuration...")?;
    config::save(&storage_file, &document)?;

    ui.notice(Notice::Success, "Device IDs have been successfully reset!")?;
    let rows: Vec<(String, String)> = ids
        .entries()
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    ui.panel("New Device IDs", &rows)?;

    Ok(ResetOutcome {
        storage_file,
        backup_file,
        ids,
    })
}

fn offer_backup(
    ui: &mut dyn ConsoleUi,
    storage_file: &Path,
    choice: BackupChoice,
) -> Result<Option<PathBuf>, ResetError> {
    // Nothing to protect yet.
    if !storage_file.exists() {
        return Ok(None);
    }

    let wants_backup = match choice {
        BackupChoice::Always => true,
        BackupChoice::Never => false,
        BackupChoice::Ask => ui
            .confirm("Would you like to create a backup before proceeding?")?
            .ok_or(ResetError::Cancelled)?,
    };

    if !wants_backup {
        ui.notice(Notice::Warning, "Proceeding without backup")?;
        return Ok(None);
    }

    ui.step("Creating backup...")?;
    let backup_file = backup::backup(storage_file)?;
    if let Some(ref path) = backup_file {
        ui.notice(
            Notice::Success,
            &format!("Backup created at {}", path.display()),
        )?;
    }
    Ok(backup_file)
}

/// Overwrite the identifier keys, leaving every other key untouched.
fn merge_ids(document: &mut ConfigDocument, ids: &DeviceIdSet) {
    for (key, value) in ids.entries() {
        document.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn is_displayed_telemetry_key(key: &str) -> bool {
    // The original tool hides `telemetry.sqmId` from its listings.
    key.starts_with("telemetry") && key != "telemetry.sqmId"
}

/// The displayable telemetry entries of a document.
#[must_use]
pub fn telemetry_entries(document: &ConfigDocument) -> ConfigDocument {
    document
        .iter()
        .filter(|(key, _)| is_displayed_telemetry_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Read-only view of the current identifier configuration. Never mutates
/// state; a missing file is reported, not created.
///
/// # Errors
/// Returns a [`ResetError`] when the path cannot be resolved or an existing
/// file cannot be read; callers report it locally and keep running.
pub fn view_config(
    ui: &mut dyn ConsoleUi,
    override_path: Option<PathBuf>,
) -> Result<(), ResetError> {
    let storage_file = resolve_storage_file(override_path)?;
    if !storage_file.exists() {
        ui.notice(Notice::Info, "No configuration file found")?;
        return Ok(());
    }

    let loaded = config::load(&storage_file)?;
    if let Some(warning) = loaded.warning {
        ui.notice(Notice::Warning, warning.message())?;
        return Ok(());
    }

    let rows: Vec<(String, String)> = telemetry_entries(&loaded.document)
        .iter()
        .map(|(key, value)| (key.clone(), display_value(value)))
        .collect();
    ui.panel("Current Device IDs", &rows)?;
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DEV_DEVICE_ID_KEY, MAC_MACHINE_ID_KEY, MACHINE_ID_KEY};
    use anyhow::{bail, ensure};
    use std::collections::VecDeque;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::tempdir;

    /// Collaborator stand-in with scripted confirm answers.
    #[derive(Default)]
    struct ScriptedUi {
        answers: VecDeque<Option<bool>>,
        confirm_count: usize,
        notices: Vec<(Notice, String)>,
        panels: Vec<(String, Vec<(String, String)>)>,
    }

    impl ScriptedUi {
        fn answering(answers: &[Option<bool>]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn has_notice(&self, kind: Notice, needle: &str) -> bool {
            self.notices
                .iter()
                .any(|(k, text)| *k == kind && text.contains(needle))
        }
    }

    impl ConsoleUi for ScriptedUi {
        fn notice(&mut self, kind: Notice, text: &str) -> io::Result<()> {
            self.notices.push((kind, text.to_string()));
            Ok(())
        }

        fn confirm(&mut self, _prompt: &str) -> io::Result<Option<bool>> {
            self.confirm_count += 1;
            Ok(self.answers.pop_front().unwrap_or(Some(true)))
        }

        fn panel(&mut self, title: &str, rows: &[(String, String)]) -> io::Result<()> {
            self.panels.push((title.to_string(), rows.to_vec()));
            Ok(())
        }

        fn step(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn read_document(path: &Path) -> anyhow::Result<ConfigDocument> {
        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;
        match value {
            Value::Object(document) => Ok(document),
            other => bail!("expected an object, got {other}"),
        }
    }

    fn doc_str<'a>(document: &'a ConfigDocument, key: &str) -> anyhow::Result<&'a str> {
        document
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("missing string key `{key}`"))
    }

    fn backup_siblings(path: &Path) -> anyhow::Result<Vec<String>> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("no parent directory"))?;
        let mut names = Vec::new();
        for entry in fs::read_dir(parent)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.contains(".backup_") {
                names.push(name);
            }
        }
        Ok(names)
    }

    #[test]
    fn reset_on_missing_file_creates_exactly_three_fields() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("User").join("globalStorage").join("storage.json");
        let mut ui = ScriptedUi::default();

        let outcome = run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Ask,
            },
        )?;

        let document = read_document(&path)?;
        ensure!(document.len() == 3);
        ensure!(doc_str(&document, MACHINE_ID_KEY)? == outcome.ids.machine_id);
        ensure!(doc_str(&document, MAC_MACHINE_ID_KEY)? == outcome.ids.mac_machine_id);
        ensure!(doc_str(&document, DEV_DEVICE_ID_KEY)? == outcome.ids.dev_device_id);
        // Missing file: no backup prompt, no backup.
        ensure!(outcome.backup_file.is_none());
        ensure!(ui.confirm_count == 0);
        Ok(())
    }

    #[test]
    fn reset_preserves_unrelated_keys_and_replaces_old_ids() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(
            &path,
            r#"{"foo": "bar", "telemetry.machineId": "old"}"#,
        )?;
        let mut ui = ScriptedUi::default();

        run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Never,
            },
        )?;

        let document = read_document(&path)?;
        ensure!(doc_str(&document, "foo")? == "bar");
        let machine_id = doc_str(&document, MACHINE_ID_KEY)?;
        ensure!(machine_id != "old");
        ensure!(machine_id.len() == 64);
        Ok(())
    }

    #[test]
    fn declined_backup_warns_and_creates_no_copy() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "{}")?;
        let mut ui = ScriptedUi::answering(&[Some(false)]);

        let outcome = run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Ask,
            },
        )?;

        ensure!(outcome.backup_file.is_none());
        ensure!(ui.has_notice(Notice::Warning, "Proceeding without backup"));
        ensure!(backup_siblings(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn accepted_backup_copies_original_bytes() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        let original = br#"{"telemetry.machineId": "old"}"#;
        fs::write(&path, original)?;
        let mut ui = ScriptedUi::answering(&[Some(true)]);

        let outcome = run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Ask,
            },
        )?;

        let Some(backup_file) = outcome.backup_file else {
            bail!("expected a backup");
        };
        ensure!(fs::read(&backup_file)? == original);
        ensure!(ui.has_notice(Notice::Success, "Backup created at"));
        Ok(())
    }

    #[test]
    fn cancelled_backup_prompt_aborts_the_reset() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        let original = br#"{"untouched": true}"#;
        fs::write(&path, original)?;
        let mut ui = ScriptedUi::answering(&[None]);

        let result = run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Ask,
            },
        );

        let Err(ResetError::Cancelled) = result else {
            bail!("expected Cancelled");
        };
        // The live file was not rewritten.
        ensure!(fs::read(&path)? == original);
        Ok(())
    }

    #[test]
    fn corrupt_document_warns_and_is_superseded() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json")?;
        let mut ui = ScriptedUi::default();

        run_reset(
            &mut ui,
            ResetParams {
                storage_file: Some(path.clone()),
                backup: BackupChoice::Never,
            },
        )?;

        ensure!(ui.has_notice(Notice::Warning, "Invalid JSON"));
        let document = read_document(&path)?;
        ensure!(document.len() == 3);
        Ok(())
    }

    #[test]
    fn view_reports_missing_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let mut ui = ScriptedUi::default();
        view_config(&mut ui, Some(dir.path().join("storage.json")))?;
        ensure!(ui.has_notice(Notice::Info, "No configuration file found"));
        ensure!(ui.panels.is_empty());
        Ok(())
    }

    #[test]
    fn view_filters_to_telemetry_keys_without_sqm_id() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(
            &path,
            r#"{"foo": "bar", "telemetry.machineId": "m", "telemetry.sqmId": "hidden"}"#,
        )?;
        let mut ui = ScriptedUi::default();

        view_config(&mut ui, Some(path))?;

        let Some((title, rows)) = ui.panels.first() else {
            bail!("expected a panel");
        };
        ensure!(title == "Current Device IDs");
        ensure!(rows.len() == 1);
        ensure!(rows
            .first()
            .is_some_and(|(key, value)| key == MACHINE_ID_KEY && value == "m"));
        Ok(())
    }
}
