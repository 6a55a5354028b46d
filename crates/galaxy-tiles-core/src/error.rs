//! Error types for galaxy-tiles.
//!
//! Every fatal condition of a run maps to one variant here. Recoverable
//! conditions (duplicate titles, failed icon downloads) never become errors;
//! they are logged where they happen.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the galaxy-tiles library.
#[derive(Debug, Error)]
pub enum TilesError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Store errors
    #[error("GOG Galaxy database unavailable: {message}")]
    SourceUnavailable {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Data-quality errors
    #[error("No games found for {selector}")]
    EmptyResult { selector: String },

    #[error("Adding too many tiles causes unexpected behaviour. {count} tiles can not be created safely (limit {limit})")]
    CapacityExceeded { count: usize, limit: usize },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // External command errors
    #[error("Could not run {program}: {message}")]
    CommandFailed { program: String, message: String },

    // Shell configuration errors
    #[error("Could not back up the current Start layout to {path:?}: {message}")]
    BackupFailed { path: PathBuf, message: String },

    #[error("Could not read Start layout policy values. You might have to run the program with admin rights. {message}")]
    ConfigUnavailable { message: String },

    #[error("Could not set Start layout lock values. You might have to run the program with admin rights. {message}. {recovery}")]
    LockWriteFailed { message: String, recovery: String },

    #[error("Could not release the Start layout lock. You might have to run the program with admin rights. {message}. {recovery}")]
    UnlockWriteFailed { message: String, recovery: String },

    #[error("Could not delete Start layout policy values. You might have to run the program with admin rights. {message}. {recovery}")]
    CleanupFailed { message: String, recovery: String },
}

/// Result type alias for galaxy-tiles operations.
pub type Result<T> = std::result::Result<T, TilesError>;

impl From<std::io::Error> for TilesError {
    fn from(err: std::io::Error) -> Self {
        TilesError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for TilesError {
    fn from(err: rusqlite::Error) -> Self {
        TilesError::SourceUnavailable {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl TilesError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        TilesError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        TilesError::Config {
            message: message.into(),
        }
    }

    /// Whether the failure most likely needs an elevated process to succeed.
    ///
    /// Registry policy writes are the dominant cause, so every configuration
    /// mutation failure is reported this way.
    pub fn requires_elevation(&self) -> bool {
        matches!(
            self,
            TilesError::ConfigUnavailable { .. }
                | TilesError::LockWriteFailed { .. }
                | TilesError::UnlockWriteFailed { .. }
                | TilesError::CleanupFailed { .. }
        )
    }

    /// Whether host shell configuration may have been left half-applied.
    pub fn leaves_partial_state(&self) -> bool {
        matches!(
            self,
            TilesError::LockWriteFailed { .. }
                | TilesError::UnlockWriteFailed { .. }
                | TilesError::CleanupFailed { .. }
        )
    }
}
