//! Tests for the validation board lifecycle and report documents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use verdict_analysis::board::{BoardState, ValidationBoard};
use verdict_analysis::comparators::{Comparator, ComparatorRegistry};
use verdict_analysis::fields::{FieldData, FieldValue, MemoryFieldOpener, MemoryFieldSource};
use verdict_analysis::norms::{MemoryListingOpener, NormsSet, NormsSnapshot};
use verdict_analysis::references::ReferenceResource;
use verdict_core::config::VerdictConfig;
use verdict_core::errors::{BoardError, ComparatorError, VerdictErrorCode};
use verdict_core::report::{keys, ReportDocument};

/// Comparator returning a fixed result and counting its calls.
struct StaticComparator {
    kind: String,
    side_expert: bool,
    fatal: bool,
    result: Result<ReportDocument, String>,
    parse_error: Option<String>,
    compares: Arc<AtomicUsize>,
}

impl StaticComparator {
    fn new(kind: &str, result: ReportDocument) -> Self {
        Self {
            kind: kind.to_string(),
            side_expert: false,
            fatal: true,
            result: Ok(result),
            parse_error: None,
            compares: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(kind: &str, message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            ..Self::new(kind, ReportDocument::new())
        }
    }

    fn side(mut self) -> Self {
        self.side_expert = true;
        self
    }

    fn lenient(mut self) -> Self {
        self.fatal = false;
        self
    }

    fn parse_error(mut self, message: &str) -> Self {
        self.parse_error = Some(message.to_string());
        self
    }

    fn boxed(self) -> Box<dyn Comparator> {
        Box::new(self)
    }
}

impl Comparator for StaticComparator {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn side_expert(&self) -> bool {
        self.side_expert
    }

    fn fatal_exceptions(&self) -> bool {
        self.fatal
    }

    fn parse(&mut self) -> Result<ReportDocument, ComparatorError> {
        match &self.parse_error {
            Some(message) => Err(ComparatorError::Failed {
                kind: self.kind.clone(),
                message: message.clone(),
            }),
            None => Ok(ReportDocument::new().with("Parsed", true)),
        }
    }

    fn compare(&self, _references: &[ReferenceResource]) -> Result<ReportDocument, ComparatorError> {
        self.compares.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|message| ComparatorError::Failed {
            kind: self.kind.clone(),
            message,
        })
    }
}

fn validated(value: bool, means: &str) -> ReportDocument {
    ReportDocument::new()
        .with(keys::VALIDATED, value)
        .with(keys::VALIDATED_MEANS, means)
}

fn reference(kind: &str, task: &str) -> ReferenceResource {
    ReferenceResource::new(kind, format!("ref.{kind}")).with_producer_task(task)
}

fn symbol(doc: &ReportDocument) -> Option<&str> {
    doc.get_in(&[keys::COMPARISON_STATUS, "symbol"])
        .and_then(|v| v.as_str())
}

#[test]
fn test_new_board_has_ended_status() {
    let dir = tempfile::TempDir::new().unwrap();
    let board = ValidationBoard::new(Vec::new(), None, dir.path());
    assert_eq!(board.state(), BoardState::Initialized);
    assert_eq!(
        board.task_summary().get_in(&[keys::STATUS, "symbol"]).and_then(|v| v.as_str()),
        Some("E")
    );
}

#[test]
fn test_no_reference_skips_every_comparison() {
    let dir = tempfile::TempDir::new().unwrap();
    let norms = StaticComparator::new("norms", validated(true, "A"));
    let fields = StaticComparator::new("fields_in_file", validated(true, "B"));
    let counters = [Arc::clone(&norms.compares), Arc::clone(&fields.compares)];
    let mut board = ValidationBoard::new(vec![norms.boxed(), fields.boxed()], None, dir.path());

    board.process(&[], &[]).unwrap();

    assert!(counters.iter().all(|c| c.load(Ordering::SeqCst) == 0));
    assert_eq!(symbol(board.consistency()), Some("0"));
    assert_eq!(symbol(board.continuity()), Some("0"));
    assert_eq!(board.state(), BoardState::Dumped);
    assert!(board.task_summary().contains_key(keys::UPDATED));
}

#[test]
fn test_end_to_end_with_inferred_lead() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![
        StaticComparator::new("norms", validated(true, "norms are bit-repro")).side().boxed(),
        StaticComparator::new("fields_in_file", validated(false, "fields are bit-repro")).boxed(),
    ];
    let mut board = ValidationBoard::new(panel, None, dir.path());

    let consistency = vec![reference("historic", "forecast"), reference("plisting", "forecast")];
    board.process(&consistency, &[]).unwrap();

    assert_eq!(board.lead_comparator(), Some("fields_in_file"));
    let doc = board.consistency();
    assert_eq!(symbol(doc), Some("KO"));
    assert_eq!(doc.get_str(keys::LEAD_EXPERT), Some("fields_in_file"));
    assert_eq!(doc.get_str(keys::REFERENCE_TASK), Some("forecast"));
    // side comparator still reported
    assert!(doc.get_document("norms").is_some());
    assert_eq!(symbol(board.continuity()), Some("0"));

    for file in ["task_summary.json", "task_consistency.json", "task_continuity.json"] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }
    let dumped = ReportDocument::load(&dir.path().join("task_consistency.json")).unwrap();
    assert_eq!(&dumped, board.consistency());
}

#[test]
fn test_configured_lead_is_never_overridden() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![
        StaticComparator::new("norms", validated(true, "A")).side().boxed(),
        StaticComparator::new("fields_in_file", validated(true, "B")).boxed(),
    ];
    let mut board = ValidationBoard::new(panel, Some("norms".to_string()), dir.path());
    board.process(&[], &[reference("historic", "previous-cycle")]).unwrap();

    assert_eq!(board.lead_comparator(), Some("norms"));
    assert_eq!(board.continuity().get_str(keys::LEAD_EXPERT), Some("norms"));
    assert_eq!(symbol(board.continuity()), Some("OK"));
}

#[test]
fn test_configured_lead_decides_between_non_side_comparators() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![
        StaticComparator::new("norms", validated(true, "norms are bit-repro")).boxed(),
        StaticComparator::new("fields_in_file", validated(false, "fields are bit-repro")).boxed(),
    ];
    let mut board = ValidationBoard::new(panel, Some("fields_in_file".to_string()), dir.path());
    board.process(&[reference("historic", "t")], &[]).unwrap();

    let doc = board.consistency();
    assert_eq!(symbol(doc), Some("KO"));
    assert_eq!(doc.get_str(keys::LEAD_EXPERT), Some("fields_in_file"));
    let text = doc
        .get_in(&[keys::COMPARISON_STATUS, "text"])
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(text, "Fail: \"fields are bit-repro\" is False");
    assert_eq!(doc.get_in(&["norms", keys::VALIDATED]).and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn test_no_lead_with_two_non_side_comparators() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![
        StaticComparator::new("norms", validated(true, "A")).boxed(),
        StaticComparator::new("fields_in_file", validated(true, "B")).boxed(),
    ];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    board.process(&[reference("historic", "t")], &[]).unwrap();

    assert_eq!(board.lead_comparator(), None);
    assert!(!board.consistency().contains_key(keys::LEAD_EXPERT));
    let text = board
        .consistency()
        .get_in(&[keys::COMPARISON_STATUS, "text"])
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(text, "Success: \"A\" | Success: \"B\"");
}

#[test]
fn test_inconsistent_references_are_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![StaticComparator::new("norms", validated(true, "A")).lenient().boxed()];
    let mut board = ValidationBoard::new(panel, None, dir.path());

    let consistency = vec![reference("historic", "forecast"), reference("plisting", "canari")];
    let err = board.process(&consistency, &[]).unwrap_err();
    assert!(matches!(err, BoardError::InconsistentReferences { .. }));
    assert_eq!(err.error_code(), "INCONSISTENT_REFERENCES");
}

#[test]
fn test_non_fatal_compare_error_gives_comparison_issue() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![
        StaticComparator::new("norms", validated(true, "A")).boxed(),
        StaticComparator::failing("fields_in_file", "cannot open file").lenient().boxed(),
    ];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    board.process(&[reference("historic", "t")], &[]).unwrap();

    let doc = board.consistency();
    assert_eq!(symbol(doc), Some("!"));
    let failed = doc.get_document("fields_in_file").unwrap();
    assert_eq!(failed.get_str(keys::COMPARISON), Some("Failed"));
    assert!(failed.get_str(keys::ERROR).unwrap().contains("cannot open file"));
}

#[test]
fn test_fatal_compare_error_aborts() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![StaticComparator::failing("norms", "boom").boxed()];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    assert!(board.process(&[reference("plisting", "t")], &[]).is_err());
}

#[test]
fn test_crashed_reference_clears_other_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    let crashed = verdict_core::status::StatusCode::reference_crashed("Reference crashed");
    let panel = vec![
        StaticComparator::new("fields_in_file", validated(false, "B")).boxed(),
        StaticComparator::new("crash", crashed.to_document()).side().boxed(),
    ];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    board.process(&[reference("historic", "t")], &[]).unwrap();

    let doc = board.consistency();
    assert_eq!(symbol(doc), Some("+"));
    assert!(!doc.contains_key("fields_in_file"));
    assert!(doc.contains_key("crash"));
}

#[test]
fn test_non_fatal_parse_error_is_a_warning() {
    let dir = tempfile::TempDir::new().unwrap();
    let broken = StaticComparator::new("norms", validated(true, "A"))
        .lenient()
        .parse_error("listing not found");
    let broken_calls = Arc::clone(&broken.compares);
    let panel = vec![
        broken.boxed(),
        StaticComparator::new("fields_in_file", validated(true, "B")).boxed(),
    ];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    board.parse().unwrap();

    let warnings = board
        .task_summary()
        .get(keys::WARNINGS)
        .and_then(|v| v.as_list())
        .unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(!board.task_summary().contains_key("norms"));
    assert!(board.task_summary().contains_key("fields_in_file"));
    assert!(dir.path().join("task_summary.json").exists());

    board.compare(&[reference("historic", "t")], &[]).unwrap();
    assert_eq!(broken_calls.load(Ordering::SeqCst), 0);
    assert_eq!(symbol(board.consistency()), Some("OK"));
}

#[test]
fn test_fatal_parse_error_aborts() {
    let dir = tempfile::TempDir::new().unwrap();
    let panel = vec![StaticComparator::new("norms", validated(true, "A"))
        .parse_error("listing not found")
        .boxed()];
    let mut board = ValidationBoard::new(panel, None, dir.path());
    assert!(matches!(board.parse(), Err(BoardError::Comparator(_))));
}

#[test]
fn test_transitions_only_go_forward() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut board = ValidationBoard::new(Vec::new(), None, dir.path());

    let err = board.compare(&[], &[]).unwrap_err();
    assert!(matches!(err, BoardError::InvalidTransition { .. }));

    board.parse().unwrap();
    assert!(board.parse().is_err());
    board.mark_no_reference().unwrap();
    board.dump().unwrap();
    board.dump().unwrap();
    assert_eq!(board.state(), BoardState::Dumped);
    assert!(board.compare(&[], &[]).is_err());
}

#[test]
fn test_remember_listings() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut board = ValidationBoard::new(Vec::new(), None, dir.path());

    let promised = vec![
        ReferenceResource::new("listing", "NODE.001_01").with_uri("file:///run/NODE.001_01;ftp://archive/NODE.001_01"),
        ReferenceResource::new("historic", "ICMSHFCST+0000"),
    ];
    let continuity = vec![ReferenceResource::new("plisting", "ref.NODE").with_uri("ftp://archive/ref/NODE.001_01")];
    board.remember_listings(&promised, &continuity).unwrap();

    let listing = board.task_summary().get_document(keys::LISTING).unwrap();
    assert_eq!(
        listing.get("Task listing uri(s)").and_then(|v| v.as_list()).map(|l| l.len()),
        Some(2)
    );
    let pair = board
        .continuity()
        .get_in(&[keys::LISTINGS, "Compare listings at uri(s)", "ref"])
        .and_then(|v| v.as_list())
        .unwrap();
    assert_eq!(pair[0].as_str(), Some("ftp://archive/ref/NODE.001_01"));

    let two = vec![
        ReferenceResource::new("listing", "a"),
        ReferenceResource::new("plisting", "b"),
    ];
    let err = board.remember_listings(&two, &[]).unwrap_err();
    assert!(matches!(err, BoardError::AmbiguousListing { .. }));
}

#[test]
fn test_record_crash() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut board = ValidationBoard::new(Vec::new(), None, dir.path());
    board.record_crash("segmentation fault", true);
    let status = board.task_summary().get_document(keys::STATUS).unwrap();
    assert_eq!(status.get_str("symbol"), Some("X=R"));
    assert_eq!(status.get_str("exception"), Some("segmentation fault"));
}

#[test]
fn test_board_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let work = dir.path().join("run");
    let toml = format!(
        r#"
[board]
work_dir = "{work}"

[[board.comparators]]
kind = "norms"
side_expert = true
mode = "last"

[[board.comparators]]
kind = "fields_in_file"
filenames = ["ICMSHFCST+0000"]
"#,
        work = work.display()
    );
    let config = VerdictConfig::from_toml(&toml).unwrap();

    let field = FieldValue::new(FieldData::float(vec![3], vec![1.0, 2.0, 3.0]));
    let fields = MemoryFieldOpener::new()
        .with_source(work.join("ICMSHFCST+0000"), MemoryFieldSource::new("t").with_field("T", field.clone()))
        .with_source(work.join("ref.ICMSHFCST+0000"), MemoryFieldSource::new("r").with_field("T", field));
    let norms = NormsSet::new(vec![NormsSnapshot::new(0).with_norm("spnorms", "VORTICITY", 1.0)]);
    let listings = MemoryListingOpener::new()
        .with_listing(work.join("NODE.001_01"), norms.clone())
        .with_listing(work.join("ref.NODE.001_01"), norms);

    let mut board = ValidationBoard::from_config(
        &config,
        &ComparatorRegistry::with_defaults(),
        Arc::new(fields),
        Arc::new(listings),
    )
    .unwrap();
    assert_eq!(board.output_dir(), work.as_path());

    let consistency = vec![
        ReferenceResource::new("historic", "ref.ICMSHFCST+0000").with_producer_task("forecast"),
        ReferenceResource::new("plisting", "ref.NODE.001_01").with_producer_task("forecast"),
    ];
    board.process(&consistency, &[]).unwrap();

    let doc = board.consistency();
    assert_eq!(symbol(doc), Some("OK"));
    assert_eq!(doc.get_str(keys::LEAD_EXPERT), Some("fields_in_file"));
    assert_eq!(
        doc.get_in(&["norms", keys::VALIDATED]).and_then(|v| v.as_bool()),
        Some(true)
    );
    assert!(work.join("task_summary.json").exists());
}
