//! Error types for safeharbor.
//!
//! Field validation failures are not errors in this sense: they are surfaced as
//! inline form state (see [`crate::form::validate`]). This module covers the
//! system side only: storage, configuration, I/O and controller setup.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by safeharbor operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The draft database could not be opened or created.
    #[error("failed to open draft database at {path}: {source}")]
    DatabaseOpen {
        /// Database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A statement against the draft database failed.
    #[error("draft database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The schema could not be created or upgraded.
    #[error("draft database migration failed: {message}")]
    DatabaseMigration {
        /// What went wrong.
        message: String,
    },

    /// A stored draft is not a JSON object of field values.
    #[error("corrupt draft for form '{form_id}': {message}")]
    CorruptDraft {
        /// Form the draft belongs to.
        form_id: String,
        /// What went wrong.
        message: String,
    },

    /// Configuration sources could not be read or merged.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// A loaded configuration holds values the controllers can't work with.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// The offending setting and why.
        message: String,
    },

    /// A slider was built over zero panels.
    #[error("slider '{name}' has no panels")]
    NoPanels {
        /// Slider name.
        name: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Directory that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Draft or resource JSON could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for safeharbor operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// A draft for `form_id` that failed to decode.
    #[must_use]
    pub fn corrupt_draft(form_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptDraft {
            form_id: form_id.into(),
            message: message.into(),
        }
    }

    /// An invalid setting.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Whether the draft store produced this error. Pages treat these as
    /// recoverable and carry on with an empty form.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::CorruptDraft { .. }
        )
    }
}
