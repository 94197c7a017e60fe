//! Shared constants for the verdict validation engine.

/// Verdict version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Absolute tolerance under which two float values are considered bit-reproducible.
pub const EPSILON: f64 = 1e-12;

/// Default threshold on the maximum normalized field error for validation.
pub const NORMALIZED_FIELDS_DIFF: f64 = 1e-3;

/// Maximum number of differing digits in norms for bit-reproducibility.
pub const NORMSDIGITS_BITREPRO: u32 = 0;

/// Number of significant digits norms are compared on.
pub const NORMS_SIGNIFICANT_DIGITS: u32 = 16;

/// Fields whose name starts with this prefix are internal buffers, never compared.
pub const SKIPPED_FIELD_PREFIX: &str = "SFX._FBUF_";

/// Prefixes a reference file can carry in the working directory.
pub const REFERENCE_PREFIXES: &[&str] = &["ref.", "continuity.", "consistency."];

/// Report file names written by the validation board.
pub const TASK_SUMMARY_FILE: &str = "task_summary.json";
pub const CONSISTENCY_FILE: &str = "task_consistency.json";
pub const CONTINUITY_FILE: &str = "task_continuity.json";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "verdict.toml";

/// Default listing name parsed by the norms comparator.
pub const DEFAULT_LISTING: &str = "NODE.001_01";

/// Resource kind of a reference listing.
pub const LISTING_KIND: &str = "plisting";

/// Resource kinds of a promised task listing.
pub const TASK_LISTING_KINDS: &[&str] = &["listing", "plisting"];

/// Resource kind of a reference task summary.
pub const TASKINFO_KIND: &str = "taskinfo";

/// Resource kinds accepted as field files by the fields comparator.
pub const FIELD_FILE_KINDS: &[&str] = &[
    "historic",
    "gridpoint",
    "pgdfa",
    "initial_condition",
    "boundary",
    "analysis",
];

/// Default glob patterns used to discover field files at parse time.
///
/// History files carry a 4-character experiment name after the prefix, then
/// a 4-digit term, optionally with minutes and a `.sfx` surface suffix.
pub const DEFAULT_FIELD_FILE_PATTERNS: &[&str] = &[
    "ICMSH????*+[0-9][0-9][0-9][0-9]",
    "ICMSH????*+[0-9][0-9][0-9][0-9]:[0-9][0-9]",
    "ICMSH????*+[0-9][0-9][0-9][0-9].sfx",
    "ICMSH????*+[0-9][0-9][0-9][0-9]:[0-9][0-9].sfx",
    "PF????*+[0-9][0-9][0-9][0-9]",
    "PF????*+[0-9][0-9][0-9][0-9]:[0-9][0-9]",
    "PF????*+[0-9][0-9][0-9][0-9].sfx",
    "PF????*+[0-9][0-9][0-9][0-9]:[0-9][0-9].sfx",
    "GRIBPF????*+[0-9][0-9][0-9][0-9]",
    "GRIBPF????*+[0-9][0-9][0-9][0-9]:[0-9][0-9]",
    "GRIBPF????*+[0-9][0-9][0-9][0-9].sfx",
    "GRIBPF????*+[0-9][0-9][0-9][0-9]:[0-9][0-9].sfx",
    "CPLOUT+[0-9][0-9][0-9][0-9]",
    "CPLOUT+[0-9][0-9][0-9][0-9]:[0-9][0-9]",
    "PGD.fa",
    "PREP1_interpolated.fa",
];
