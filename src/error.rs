use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a reset or view operation.
///
/// The interactive layer maps every variant to one consistent error notice,
/// so each carries a human-readable message plus the underlying cause where
/// one exists. Recoverable conditions (a corrupt configuration file) are not
/// errors; see [`crate::config::LoadWarning`].
#[derive(Debug, Error)]
pub enum ResetError {
    /// The host OS has no known configuration location.
    #[error("unsupported operating system `{os}`; supported systems are windows, macos and linux")]
    UnsupportedPlatform {
        /// The rejected OS identifier.
        os: String,
    },

    /// The configuration root is missing or cannot be written by this user.
    #[error("configuration root {} is missing or not writable", path.display())]
    PathUnavailable {
        /// The rejected base directory.
        path: PathBuf,
        /// The probe failure, when the directory exists but is not writable.
        #[source]
        source: Option<io::Error>,
    },

    /// An existing storage file could not be read at all.
    #[error("failed to read configuration {}", path.display())]
    Read {
        /// The storage file.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document could not be serialized to JSON.
    #[error("failed to encode configuration JSON")]
    Encode(#[source] serde_json::Error),

    /// The document could not be written back to disk.
    #[error("failed to save configuration {}", path.display())]
    Save {
        /// The storage file.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backup copy failed; the reset must not proceed.
    #[error("failed to create backup of {}", path.display())]
    Backup {
        /// The file being backed up.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS random source failed.
    #[error("failed to read OS randomness")]
    Randomness(#[source] rand::Error),

    /// The terminal collaborator failed to display or prompt.
    #[error("terminal interaction failed")]
    Terminal(#[from] io::Error),

    /// The user interrupted a prompt.
    #[error("operation cancelled by user")]
    Cancelled,
}
