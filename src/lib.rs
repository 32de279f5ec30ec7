//! `wsreset` is a small internal library backing the `wsreset` CLI binary.
//!
//! It resets the device identifiers stored in Windsurf's `storage.json`:
//! - OS-specific resolution of the storage file location
//! - Tolerant load / atomic save of the JSON configuration document
//! - Cryptographically random identifier generation
//! - Timestamped backups of the existing file
//! - The reset/view workflows, driven through a terminal collaborator

/// Timestamped backups of the storage file.
pub mod backup;
/// Load and save the JSON configuration document.
pub mod config;
/// The domain error taxonomy.
pub mod error;
/// Device identifier generation.
pub mod ids;
/// Storage file location per operating system.
pub mod paths;
/// Terminal presentation collaborator.
pub mod ui;
/// The reset and view operations.
pub mod workflow;
