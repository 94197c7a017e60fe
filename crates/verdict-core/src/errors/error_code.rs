//! VerdictErrorCode trait for structured error reporting.

/// Every error enum provides a stable code string, so that consumers of the
/// report (and log queries) do not depend on message wording.
pub trait VerdictErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";
pub const DIFF_ERROR: &str = "DIFF_ERROR";
pub const UNKNOWN_COMPARATOR: &str = "UNKNOWN_COMPARATOR";
pub const COMPARATOR_ERROR: &str = "COMPARATOR_ERROR";
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
pub const NO_REFERENCE: &str = "NO_REFERENCE";
pub const INCONSISTENT_REFERENCES: &str = "INCONSISTENT_REFERENCES";
pub const BOARD_ERROR: &str = "BOARD_ERROR";
