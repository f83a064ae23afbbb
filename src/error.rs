//! Crate-level error taxonomy.
//!
//! Each module owns a focused `thiserror` enum ([`BackendError`],
//! [`SourceError`], [`ConfigError`], [`ColorError`]). Operations that span
//! several modules (creating a session, encoding, saving) return [`Error`],
//! which groups them into the four caller-visible categories:
//!
//! | Variant | Raised for |
//! |---|---|
//! | `Configuration` | unsupported output format, invalid alignment or resize-mode keyword |
//! | `Source` | unregistered source name, empty gallery, failed remote fetch |
//! | `Io` | missing or read-only save directory, failed write |
//! | `Validation` | malformed color strings |
//!
//! Nothing is retried or swallowed: every error surfaces to the immediate
//! caller of the operation that detected it.

use thiserror::Error;

use crate::color::ColorError;
use crate::config::ConfigError;
use crate::imaging::BackendError;
use crate::sources::SourceError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(#[from] ColorError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
