//! Validation board configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ComparatorSpec;

/// Configuration of the validation board and its comparator panel.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoardConfig {
    /// Kind of the comparator whose verdict is authoritative.
    /// Default: inferred when exactly one non-side comparator exists.
    pub lead_comparator: Option<String>,
    /// Directory holding the task outputs. Default: ".".
    pub work_dir: Option<PathBuf>,
    /// Directory the report documents are written to. Default: the work dir.
    pub output_dir: Option<PathBuf>,
    /// The comparator panel, in evaluation order.
    pub comparators: Vec<ComparatorSpec>,
}

impl BoardConfig {
    /// Returns the effective working directory, defaulting to ".".
    pub fn effective_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the effective output directory, defaulting to the work dir.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.effective_work_dir())
    }
}
