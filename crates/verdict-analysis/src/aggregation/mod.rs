//! Status aggregation over a comparator panel.

pub mod status;

pub use status::{Aggregation, PanelMember, StatusAggregator};
