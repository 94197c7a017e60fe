//! Comparators and their registry.

pub mod context;
pub mod fields;
pub mod norms;
pub mod registry;
pub mod types;

pub use context::ComparatorContext;
pub use fields::{FieldSetComparator, FieldsOptions};
pub use norms::{NormsComparator, NormsOptions};
pub use registry::{ComparatorConstructor, ComparatorRegistry};
pub use types::{Comparator, ComparatorSettings};
