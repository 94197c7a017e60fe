//! Top-level verdict configuration with 4-layer resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::BoardConfig;
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`VERDICT_*`)
/// 3. Project config (`verdict.toml` in the project root)
/// 4. User config (`~/.verdict/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerdictConfig {
    pub board: BoardConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub lead_comparator: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl VerdictConfig {
    /// Load configuration with 4-layer resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        ::tracing::warn!(error = %e, "Ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the comparator panel.
    pub fn validate(config: &VerdictConfig) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for spec in &config.board.comparators {
            if spec.kind.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "board.comparators.kind".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            if !seen.insert(spec.kind.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    field: "board.comparators.kind".to_string(),
                    message: format!("'{}' appears more than once in the panel", spec.kind),
                });
            }
        }
        if let Some(ref lead) = config.board.lead_comparator {
            if !config.board.comparators.is_empty() && !seen.contains(lead.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    field: "board.lead_comparator".to_string(),
                    message: format!("'{lead}' is not a comparator of the panel"),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.verdict/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut VerdictConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: VerdictConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, file_config);
        Ok(())
    }

    /// Merge `other` into `base`: `Some` values and a non-empty panel override.
    fn merge(base: &mut VerdictConfig, other: VerdictConfig) {
        if other.board.lead_comparator.is_some() {
            base.board.lead_comparator = other.board.lead_comparator;
        }
        if other.board.work_dir.is_some() {
            base.board.work_dir = other.board.work_dir;
        }
        if other.board.output_dir.is_some() {
            base.board.output_dir = other.board.output_dir;
        }
        if !other.board.comparators.is_empty() {
            base.board.comparators = other.board.comparators;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(config: &mut VerdictConfig) {
        if let Ok(val) = std::env::var("VERDICT_LEAD_COMPARATOR") {
            if !val.is_empty() {
                config.board.lead_comparator = Some(val);
            }
        }
        if let Ok(val) = std::env::var("VERDICT_WORK_DIR") {
            config.board.work_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("VERDICT_OUTPUT_DIR") {
            config.board.output_dir = Some(PathBuf::from(val));
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut VerdictConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.lead_comparator {
            config.board.lead_comparator = Some(v.clone());
        }
        if let Some(ref v) = cli.work_dir {
            config.board.work_dir = Some(v.clone());
        }
        if let Some(ref v) = cli.output_dir {
            config.board.output_dir = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level config directory: `~/.verdict/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".verdict"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
