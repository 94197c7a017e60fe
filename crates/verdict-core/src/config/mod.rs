//! Configuration system for verdict.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod board_config;
pub mod comparator_spec;
pub mod verdict_config;

pub use board_config::BoardConfig;
pub use comparator_spec::ComparatorSpec;
pub use verdict_config::{CliOverrides, VerdictConfig};
