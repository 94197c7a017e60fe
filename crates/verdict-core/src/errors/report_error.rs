//! Report document errors.

use super::error_code::{self, VerdictErrorCode};

/// Errors raised while building, writing or loading report documents.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Key already present in report document: {key}")]
    DuplicateKey { key: String },

    #[error("Failed to write report {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to read report {path}: {message}")]
    Read { path: String, message: String },

    #[error("Report serialization failed: {0}")]
    Serialize(String),

    #[error("Report parse error in {path}: {message}")]
    Parse { path: String, message: String },
}

impl VerdictErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => error_code::DUPLICATE_KEY,
            _ => error_code::REPORT_ERROR,
        }
    }
}
