//! Field and norms diff errors.

use super::error_code::{self, VerdictErrorCode};

/// Errors that can occur while reading or comparing one unit (field, listing).
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("Cannot open {path}: {message}")]
    Open { path: String, message: String },

    #[error("Cannot read field {field}: {message}")]
    ReadField { field: String, message: String },

    #[error("Spectral to grid-point transform failed for {field}: {message}")]
    SpectralTransform { field: String, message: String },

    #[error("Cannot parse norms from {path}: {message}")]
    Listing { path: String, message: String },

    #[error("Malformed norms summary: {0}")]
    NormsSummary(String),
}

impl VerdictErrorCode for DiffError {
    fn error_code(&self) -> &'static str {
        error_code::DIFF_ERROR
    }
}
