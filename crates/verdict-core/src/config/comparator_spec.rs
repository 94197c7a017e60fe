//! Comparator entry: the configuration record a comparator is built from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// One entry of the comparator panel.
///
/// `kind` selects the comparator in the registry; every other key of the
/// TOML table is kept in `options` and deserialized by the comparator into
/// its own typed options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComparatorSpec {
    pub kind: String,
    /// Recorded in the report but never drives the verdict. Default: false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_expert: Option<bool>,
    /// Whether the comparator's own errors abort the run. Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal_exceptions: Option<bool>,
    #[serde(flatten)]
    pub options: toml::Table,
}

impl ComparatorSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn side_expert(mut self, side_expert: bool) -> Self {
        self.side_expert = Some(side_expert);
        self
    }

    pub fn fatal_exceptions(mut self, fatal: bool) -> Self {
        self.fatal_exceptions = Some(fatal);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn effective_side_expert(&self) -> bool {
        self.side_expert.unwrap_or(false)
    }

    pub fn effective_fatal_exceptions(&self) -> bool {
        self.fatal_exceptions.unwrap_or(true)
    }

    /// Deserialize the comparator-specific options into `T`.
    /// Unknown keys are rejected only if `T` denies them.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        toml::Value::Table(self.options.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::InvalidValue {
                field: format!("board.comparators[{}]", self.kind),
                message: e.to_string(),
            })
    }
}
