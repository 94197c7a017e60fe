//! Report keys shared by comparators, the aggregator and the board.

pub const VALIDATED: &str = "Validated";
pub const VALIDATED_MEANS: &str = "Validated means";
pub const BIT_REPRODUCIBLE: &str = "Bit-reproducible";
pub const COMPARISON: &str = "Comparison";
pub const COMPARISON_FAILED: &str = "Failed";
pub const COMPARISON_STATUS: &str = "comparisonStatus";
pub const MAIN_METRICS: &str = "mainMetrics";
pub const ERROR: &str = "Error";

pub const LEAD_EXPERT: &str = "leadExpert";
pub const REFERENCE_TASK: &str = "referenceTask";
pub const STATUS: &str = "Status";
pub const UPDATED: &str = "Updated";
pub const WARNINGS: &str = "Warnings";
pub const LISTING: &str = "Listing";
pub const LISTINGS: &str = "Listings";
