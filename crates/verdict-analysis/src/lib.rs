//! Validation engine: compares task outputs against reference runs and
//! merges the verdicts of a comparator panel into one status per category.
//!
//! - `fields` / `norms`: the numeric diff engines.
//! - `comparators`: parse outputs and compare them against references.
//! - `aggregation`: ranks comparator results into a single status.
//! - `board`: drives the whole run and writes the report documents.

pub mod aggregation;
pub mod board;
pub mod comparators;
pub mod fields;
pub mod norms;
pub mod references;
