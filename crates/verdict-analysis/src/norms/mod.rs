//! Norms diff engine: worst differing digit over sequences of norms.

pub mod diff;
pub mod digits;
pub mod source;
pub mod types;

pub use diff::{compare_snapshots, NormsComparison};
pub use digits::differing_digits;
pub use source::{ListingOpener, ListingSource, MemoryListingOpener};
pub use types::{summary_key, NormsMode, NormsSet, NormsSnapshot, NormsType};
