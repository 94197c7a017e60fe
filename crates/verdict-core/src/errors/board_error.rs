//! Validation board errors.

use super::error_code::{self, VerdictErrorCode};
use super::{ComparatorError, ConfigError, ReportError};

/// Errors that abort a validation board run.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Consistency reference resources must all come from the same task, got: {tasks:?}")]
    InconsistentReferences { tasks: Vec<String> },

    #[error("More than one {which} listing: {uris:?}")]
    AmbiguousListing { which: String, uris: Vec<String> },

    #[error("Invalid board transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Comparator error: {0}")]
    Comparator(#[from] ComparatorError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl VerdictErrorCode for BoardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InconsistentReferences { .. } => error_code::INCONSISTENT_REFERENCES,
            Self::Comparator(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            _ => error_code::BOARD_ERROR,
        }
    }
}
