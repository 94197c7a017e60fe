//! Comparator errors.

use super::error_code::{self, VerdictErrorCode};
use super::{DiffError, ReportError};

/// Errors raised by comparator construction, parsing or comparison.
#[derive(Debug, thiserror::Error)]
pub enum ComparatorError {
    #[error("No comparator registered for kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("Invalid options for comparator '{kind}': {message}")]
    InvalidOptions { kind: String, message: String },

    #[error("Output file not found: {path}")]
    OutputNotFound { path: String },

    #[error("Reference file '{reference}' not found")]
    ReferenceNotFound { reference: String },

    #[error("Reference file '{reference}' has no local output equivalent '{expected}'")]
    MissingCounterpart { reference: String, expected: String },

    #[error("No reference for output file '{output}'")]
    MissingReference { output: String },

    #[error("No adequate reference for comparator '{kind}': {message}")]
    NoReference { kind: String, message: String },

    #[error("Comparator '{kind}' failed: {message}")]
    Failed { kind: String, message: String },

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl VerdictErrorCode for ComparatorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind { .. } => error_code::UNKNOWN_COMPARATOR,
            Self::OutputNotFound { .. }
            | Self::ReferenceNotFound { .. }
            | Self::MissingCounterpart { .. }
            | Self::MissingReference { .. } => error_code::RESOURCE_NOT_FOUND,
            Self::NoReference { .. } => error_code::NO_REFERENCE,
            Self::Diff(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            _ => error_code::COMPARATOR_ERROR,
        }
    }
}
