//! Error handling for verdict.
//! One error enum per subsystem, `thiserror` only.

pub mod board_error;
pub mod comparator_error;
pub mod config_error;
pub mod diff_error;
pub mod error_code;
pub mod report_error;

pub use board_error::BoardError;
pub use comparator_error::ComparatorError;
pub use config_error::ConfigError;
pub use diff_error::DiffError;
pub use error_code::VerdictErrorCode;
pub use report_error::ReportError;
