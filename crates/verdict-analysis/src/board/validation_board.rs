//! ValidationBoard: owns the panel and the three report documents.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use verdict_core::config::VerdictConfig;
use verdict_core::constants::{CONSISTENCY_FILE, CONTINUITY_FILE, TASK_LISTING_KINDS, TASK_SUMMARY_FILE};
use verdict_core::errors::{BoardError, ComparatorError, ReportError};
use verdict_core::report::{keys, ReportDocument, ReportValue};
use verdict_core::status::{StatusCode, TaskStatus};

use super::state::{BoardState, Category};
use crate::aggregation::{PanelMember, StatusAggregator};
use crate::comparators::{Comparator, ComparatorContext, ComparatorRegistry};
use crate::fields::FieldSourceOpener;
use crate::norms::ListingOpener;
use crate::references::{of_kinds, ReferenceResource};

const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Runs a comparator panel: parse, compare against the consistency and
/// continuity references, aggregate one status per category, dump.
///
/// Panel order is significant: comparators are parsed and compared in
/// order, and the aggregation follows it.
pub struct ValidationBoard {
    comparators: Vec<Box<dyn Comparator>>,
    lead_comparator: Option<String>,
    output_dir: PathBuf,
    state: BoardState,
    /// Comparators whose parse failed without being fatal.
    skipped: HashSet<String>,
    task_summary: ReportDocument,
    consistency: ReportDocument,
    continuity: ReportDocument,
}

impl ValidationBoard {
    pub fn new(
        comparators: Vec<Box<dyn Comparator>>,
        lead_comparator: Option<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let task_summary =
            ReportDocument::new().with(keys::STATUS, TaskStatus::Ended.to_document());
        Self {
            comparators,
            lead_comparator,
            output_dir: output_dir.into(),
            state: BoardState::Initialized,
            skipped: HashSet::new(),
            task_summary,
            consistency: ReportDocument::new(),
            continuity: ReportDocument::new(),
        }
    }

    /// Build the panel of `config` through `registry`.
    pub fn from_config(
        config: &VerdictConfig,
        registry: &ComparatorRegistry,
        field_opener: Arc<dyn FieldSourceOpener>,
        listing_opener: Arc<dyn ListingOpener>,
    ) -> Result<Self, BoardError> {
        VerdictConfig::validate(config)?;
        let board = &config.board;
        let ctx = ComparatorContext::new(board.effective_work_dir(), field_opener, listing_opener);
        let comparators = registry.build_panel(&board.comparators, &ctx)?;
        info!(
            comparators = comparators.len(),
            lead = ?board.lead_comparator,
            "Validation board configured"
        );
        Ok(Self::new(
            comparators,
            board.lead_comparator.clone(),
            board.effective_output_dir(),
        ))
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn lead_comparator(&self) -> Option<&str> {
        self.lead_comparator.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn task_summary(&self) -> &ReportDocument {
        &self.task_summary
    }

    pub fn consistency(&self) -> &ReportDocument {
        &self.consistency
    }

    pub fn continuity(&self) -> &ReportDocument {
        &self.continuity
    }

    pub fn category(&self, category: Category) -> &ReportDocument {
        match category {
            Category::Consistency => &self.consistency,
            Category::Continuity => &self.continuity,
        }
    }

    pub fn panel(&self) -> Vec<PanelMember> {
        self.comparators
            .iter()
            .map(|c| PanelMember::new(c.kind(), c.side_expert()))
            .collect()
    }

    /// Parse every comparator into the task summary, then dump it.
    pub fn parse(&mut self) -> Result<(), BoardError> {
        self.state.advance(BoardState::Parsed)?;
        let mut warnings = Vec::new();
        for comparator in &mut self.comparators {
            let kind = comparator.kind().to_string();
            info!(kind = %kind, "Parsing");
            match comparator.parse() {
                Ok(summary) => self.task_summary.insert(kind, summary)?,
                Err(e) if comparator.fatal_exceptions() => return Err(e.into()),
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Parse failed, comparator skipped");
                    warnings.push(ReportValue::from(format!("{kind}: {e}")));
                    self.skipped.insert(kind);
                }
            }
        }
        if !warnings.is_empty() {
            self.task_summary.set(keys::WARNINGS, ReportValue::List(warnings));
        }
        self.dump_document(&self.task_summary, TASK_SUMMARY_FILE)
    }

    /// Compare every comparator against the non-empty categories and
    /// aggregate their status.
    pub fn compare(
        &mut self,
        consistency: &[ReferenceResource],
        continuity: &[ReferenceResource],
    ) -> Result<(), BoardError> {
        self.state.advance(BoardState::Compared)?;
        if let Some(task) = reference_task(consistency)? {
            self.consistency.set(keys::REFERENCE_TASK, task);
        }

        for comparator in self.comparators.iter().filter(|c| !self.skipped.contains(c.kind())) {
            if !consistency.is_empty() {
                let result = run_compare(comparator.as_ref(), consistency, Category::Consistency)?;
                self.consistency.set(comparator.kind(), result);
            }
            if !continuity.is_empty() {
                let result = run_compare(comparator.as_ref(), continuity, Category::Continuity)?;
                self.continuity.set(comparator.kind(), result);
            }
        }

        self.apply_status(Category::Consistency);
        self.apply_status(Category::Continuity);
        Ok(())
    }

    /// No reference at all: both categories get status `0`.
    pub fn mark_no_reference(&mut self) -> Result<(), BoardError> {
        self.state.advance(BoardState::Compared)?;
        info!("No reference resource, nothing to compare");
        for category in [Category::Consistency, Category::Continuity] {
            self.category_mut(category)
                .set(keys::COMPARISON_STATUS, StatusCode::no_reference().to_document());
        }
        Ok(())
    }

    /// Parse, compare (or mark the absence of reference), stamp and dump.
    pub fn process(
        &mut self,
        consistency: &[ReferenceResource],
        continuity: &[ReferenceResource],
    ) -> Result<(), BoardError> {
        self.parse()?;
        if consistency.is_empty() && continuity.is_empty() {
            self.mark_no_reference()?;
        } else {
            self.compare(consistency, continuity)?;
        }
        let updated = chrono::Utc::now().format(UPDATED_FORMAT).to_string();
        self.task_summary.set(keys::UPDATED, updated);
        self.dump()
    }

    /// Write the three report documents into the output directory.
    pub fn dump(&mut self) -> Result<(), BoardError> {
        self.state.advance(BoardState::Dumped)?;
        self.dump_document(&self.task_summary, TASK_SUMMARY_FILE)?;
        self.dump_document(&self.consistency, CONSISTENCY_FILE)?;
        self.dump_document(&self.continuity, CONTINUITY_FILE)?;
        info!(output_dir = %self.output_dir.display(), "Report documents written");
        Ok(())
    }

    /// Record the task listing and, when a continuity listing exists, the
    /// listings to compare.
    pub fn remember_listings(
        &mut self,
        promised: &[ReferenceResource],
        continuity: &[ReferenceResource],
    ) -> Result<(), BoardError> {
        let test_uris = single_listing(promised, "task")?;
        let ref_uris = single_listing(continuity, "continuity reference")?;
        if !test_uris.is_empty() {
            self.task_summary.set(
                keys::LISTING,
                ReportDocument::new().with("Task listing uri(s)", uris_value(&test_uris)),
            );
        }
        if !ref_uris.is_empty() {
            let pair = ReportDocument::new()
                .with("test", uris_value(&test_uris))
                .with("ref", uris_value(&ref_uris));
            self.continuity.set(
                keys::LISTINGS,
                ReportDocument::new().with("Compare listings at uri(s)", pair),
            );
        }
        Ok(())
    }

    /// Record that the task crashed, possibly as its reference did.
    pub fn record_crash(&mut self, message: &str, as_in_reference: bool) {
        let status = if as_in_reference {
            TaskStatus::CrashedAsReference
        } else {
            TaskStatus::Crashed
        };
        warn!(status = status.symbol(), "Task crashed: {message}");
        self.task_summary
            .set(keys::STATUS, status.to_document().with("exception", message));
    }

    fn category_mut(&mut self, category: Category) -> &mut ReportDocument {
        match category {
            Category::Consistency => &mut self.consistency,
            Category::Continuity => &mut self.continuity,
        }
    }

    fn apply_status(&mut self, category: Category) {
        let panel = self.panel();
        if self.lead_comparator.is_none() {
            self.lead_comparator = StatusAggregator::select_lead(None, &panel);
        }
        let lead = self.lead_comparator.clone();

        let doc = self.category_mut(category);
        if doc.is_empty() {
            doc.set(keys::COMPARISON_STATUS, StatusCode::no_reference().to_document());
            return;
        }
        let aggregation = StatusAggregator::aggregate(&panel, doc);
        for kind in &aggregation.discarded {
            doc.remove(kind);
        }
        info!(
            category = category.as_str(),
            status = %aggregation.status.symbol,
            "Category status"
        );
        doc.set(keys::COMPARISON_STATUS, aggregation.status.to_document());
        if let Some(lead) = lead {
            doc.set(keys::LEAD_EXPERT, lead);
        }
    }

    fn dump_document(&self, doc: &ReportDocument, file_name: &str) -> Result<(), BoardError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ReportError::Write {
            path: self.output_dir.display().to_string(),
            message: e.to_string(),
        })?;
        doc.dump(&self.output_dir.join(file_name))?;
        Ok(())
    }
}

/// Producer task of the consistency references, which must all share it.
fn reference_task(references: &[ReferenceResource]) -> Result<Option<String>, BoardError> {
    let tasks: BTreeSet<String> = references
        .iter()
        .map(|r| r.producer_task.clone().unwrap_or_default())
        .collect();
    if tasks.len() > 1 {
        return Err(BoardError::InconsistentReferences {
            tasks: tasks.into_iter().collect(),
        });
    }
    Ok(tasks.into_iter().next().filter(|t| !t.is_empty()))
}

/// Compare one comparator; non-fatal errors become a failed comparison.
fn run_compare(
    comparator: &dyn Comparator,
    references: &[ReferenceResource],
    category: Category,
) -> Result<ReportDocument, ComparatorError> {
    info!(kind = %comparator.kind(), category = category.as_str(), "Comparing");
    match comparator.compare(references) {
        Ok(result) => Ok(result),
        Err(e) if comparator.fatal_exceptions() => Err(e),
        Err(e) => {
            warn!(kind = %comparator.kind(), category = category.as_str(), error = %e, "Comparison failed");
            Ok(ReportDocument::new()
                .with(keys::COMPARISON, keys::COMPARISON_FAILED)
                .with(keys::ERROR, e.to_string()))
        }
    }
}

/// URIs of the only listing among `resources`, if any.
fn single_listing(resources: &[ReferenceResource], which: &str) -> Result<Vec<String>, BoardError> {
    let listings: Vec<&ReferenceResource> = of_kinds(resources, TASK_LISTING_KINDS).collect();
    match listings.as_slice() {
        [] => Ok(Vec::new()),
        [only] => Ok(only.locations()),
        many => Err(BoardError::AmbiguousListing {
            which: which.to_string(),
            uris: many.iter().map(|r| r.locate().to_string()).collect(),
        }),
    }
}

fn uris_value(uris: &[String]) -> ReportValue {
    ReportValue::List(uris.iter().map(|u| ReportValue::from(u.as_str())).collect())
}
