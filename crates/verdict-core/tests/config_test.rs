//! Tests for the verdict configuration system.

use std::path::PathBuf;
use std::sync::Mutex;

use verdict_core::config::{CliOverrides, ComparatorSpec, VerdictConfig};
use verdict_core::errors::{ConfigError, VerdictErrorCode};

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all VERDICT_ env vars to prevent cross-test contamination.
fn clear_verdict_env_vars() {
    for key in [
        "VERDICT_LEAD_COMPARATOR",
        "VERDICT_WORK_DIR",
        "VERDICT_OUTPUT_DIR",
    ] {
        std::env::remove_var(key);
    }
}

const PANEL_TOML: &str = r#"
[board]
lead_comparator = "fields_in_file"
work_dir = "/data/run"

[[board.comparators]]
kind = "norms"
side_expert = true
mode = "last"
digits4validation = 2

[[board.comparators]]
kind = "fields_in_file"
fatal_exceptions = false
filenames = ["ICMSHFCST+0000", "ICMSHFCST+0006"]
"#;

#[test]
fn test_four_layer_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_verdict_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("verdict.toml"), PANEL_TOML).unwrap();

    // Env overrides the project file
    std::env::set_var("VERDICT_WORK_DIR", "/env/run");
    std::env::set_var("VERDICT_OUTPUT_DIR", "/env/out");

    // CLI overrides env
    let cli = CliOverrides {
        output_dir: Some(PathBuf::from("/cli/out")),
        ..Default::default()
    };

    let config = VerdictConfig::load(dir.path(), Some(&cli)).unwrap();
    clear_verdict_env_vars();

    assert_eq!(config.board.lead_comparator.as_deref(), Some("fields_in_file"));
    assert_eq!(config.board.work_dir, Some(PathBuf::from("/env/run")));
    assert_eq!(config.board.output_dir, Some(PathBuf::from("/cli/out")));
    assert_eq!(config.board.comparators.len(), 2);
}

#[test]
fn test_defaults_without_any_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_verdict_env_vars();

    let dir = tempdir();
    let config = VerdictConfig::load(dir.path(), None).unwrap();

    assert!(config.board.lead_comparator.is_none());
    assert!(config.board.comparators.is_empty());
    assert_eq!(config.board.effective_work_dir(), PathBuf::from("."));
    assert_eq!(config.board.effective_output_dir(), PathBuf::from("."));
}

#[test]
fn test_output_dir_defaults_to_work_dir() {
    let config = VerdictConfig::from_toml("[board]\nwork_dir = \"/scratch/task\"\n").unwrap();
    assert_eq!(
        config.board.effective_output_dir(),
        PathBuf::from("/scratch/task")
    );
}

#[test]
fn test_comparator_flags_and_options() {
    let config = VerdictConfig::from_toml(PANEL_TOML).unwrap();
    let norms = &config.board.comparators[0];
    let fields = &config.board.comparators[1];

    assert_eq!(norms.kind, "norms");
    assert!(norms.effective_side_expert());
    assert!(norms.effective_fatal_exceptions());
    assert_eq!(
        norms.options.get("mode").and_then(|v| v.as_str()),
        Some("last")
    );
    assert!(!norms.options.contains_key("kind"));

    assert!(!fields.effective_side_expert());
    assert!(!fields.effective_fatal_exceptions());
    assert_eq!(
        fields
            .options
            .get("filenames")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(2)
    );
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TypedOptions {
    mode: String,
    digits4validation: u32,
}

#[test]
fn test_options_as_typed_struct() {
    let spec = ComparatorSpec::new("norms")
        .option("mode", "all")
        .option("digits4validation", 3);
    let opts: TypedOptions = spec.options_as().unwrap();
    assert_eq!(opts.mode, "all");
    assert_eq!(opts.digits4validation, 3);

    let bad = ComparatorSpec::new("norms").option("colour", "blue");
    let err = bad.options_as::<TypedOptions>().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn test_duplicate_kind_rejected() {
    let toml = r#"
[[board.comparators]]
kind = "norms"

[[board.comparators]]
kind = "norms"
"#;
    let err = VerdictConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_empty_kind_rejected() {
    let toml = "[[board.comparators]]\nkind = \"  \"\n";
    assert!(VerdictConfig::from_toml(toml).is_err());
}

#[test]
fn test_lead_outside_panel_rejected() {
    let toml = r#"
[board]
lead_comparator = "fields_in_file"

[[board.comparators]]
kind = "norms"
"#;
    let err = VerdictConfig::from_toml(toml).unwrap_err();
    assert!(err.to_string().contains("fields_in_file"));
}

#[test]
fn test_malformed_project_config_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_verdict_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("verdict.toml"), "[board\nkind = ").unwrap();
    let err = VerdictConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_empty_env_lead_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_verdict_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("verdict.toml"), PANEL_TOML).unwrap();
    std::env::set_var("VERDICT_LEAD_COMPARATOR", "");
    let config = VerdictConfig::load(dir.path(), None).unwrap();
    clear_verdict_env_vars();

    assert_eq!(config.board.lead_comparator.as_deref(), Some("fields_in_file"));
}

#[test]
fn test_toml_round_trip_keeps_options() {
    let config = VerdictConfig::from_toml(PANEL_TOML).unwrap();
    let text = config.to_toml().unwrap();
    let again = VerdictConfig::from_toml(&text).unwrap();

    assert_eq!(again.board.comparators.len(), 2);
    assert_eq!(again.board.comparators[0].side_expert, Some(true));
    assert_eq!(again.board.comparators[1].fatal_exceptions, Some(false));
    assert_eq!(
        again.board.comparators[0]
            .options
            .get("digits4validation")
            .and_then(|v| v.as_integer()),
        Some(2)
    );
}
