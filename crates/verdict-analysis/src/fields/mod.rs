//! Field diff engines: one field against its reference, one file against
//! its reference, and a set of file pairs.

pub mod field_diff;
pub mod file_diff;
pub mod memory;
pub mod multi_file;
pub mod pairing;
pub mod source;
pub mod types;

pub use field_diff::{compare_fields, FieldsDiffOptions};
pub use file_diff::compare_sources;
pub use memory::{MemoryFieldOpener, MemoryFieldSource};
pub use multi_file::{FileResult, FileSetSummary};
pub use pairing::{make_pairs, FilePair, Pairing};
pub use source::{FieldSource, FieldSourceOpener};
pub use types::*;
