//! Report documents: ordered, nested key → value documents written as JSON.

pub mod document;
pub mod keys;
pub mod value;

pub use document::ReportDocument;
pub use value::ReportValue;
