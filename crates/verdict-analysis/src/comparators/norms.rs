//! Norms comparator: compares the norms printed in the task listing.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use verdict_core::config::ComparatorSpec;
use verdict_core::constants::{DEFAULT_LISTING, LISTING_KIND, NORMSDIGITS_BITREPRO, TASKINFO_KIND};
use verdict_core::errors::{ComparatorError, DiffError};
use verdict_core::report::{ReportDocument, ReportValue};

use super::context::ComparatorContext;
use super::types::{no_adequate_reference, Comparator, ComparatorSettings};
use crate::norms::{compare_snapshots, summary_key, ListingOpener, NormsMode, NormsSet, NormsSnapshot, NormsType};
use crate::references::{of_kinds, ReferenceResource};

/// Options of the `norms` comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormsOptions {
    /// Listing file, relative to the work dir.
    pub output: String,
    /// Maximum number of differing digits for validation.
    pub digits4validation: u32,
    pub normstype: NormsType,
    /// Snapshots compared against a reference task summary.
    pub mode: NormsMode,
}

impl Default for NormsOptions {
    fn default() -> Self {
        Self {
            output: DEFAULT_LISTING.to_string(),
            digits4validation: NORMSDIGITS_BITREPRO,
            normstype: NormsType::Both,
            mode: NormsMode::LastSpectral,
        }
    }
}

pub struct NormsComparator {
    settings: ComparatorSettings,
    options: NormsOptions,
    work_dir: PathBuf,
    opener: Arc<dyn ListingOpener>,
    norms: Option<NormsSet>,
}

impl NormsComparator {
    pub const KIND: &'static str = "norms";

    pub fn new(settings: ComparatorSettings, options: NormsOptions, ctx: &ComparatorContext) -> Self {
        Self {
            settings,
            options,
            work_dir: ctx.work_dir.clone(),
            opener: Arc::clone(&ctx.listing_opener),
            norms: None,
        }
    }

    /// Registry constructor.
    pub fn from_spec(
        spec: &ComparatorSpec,
        ctx: &ComparatorContext,
    ) -> Result<Box<dyn Comparator>, ComparatorError> {
        let options: NormsOptions = spec
            .options_as()
            .map_err(|e| ComparatorError::InvalidOptions {
                kind: spec.kind.clone(),
                message: e.to_string(),
            })?;
        Ok(Box::new(Self::new(ComparatorSettings::from_spec(spec), options, ctx)))
    }

    pub fn options(&self) -> &NormsOptions {
        &self.options
    }

    /// `Number of steps` plus the norms selected by mode and type.
    pub fn summary(&self, norms: &NormsSet) -> ReportDocument {
        let selected = norms.select(self.options.mode, self.options.normstype);
        let value = match self.options.mode {
            NormsMode::All => ReportValue::List(
                selected
                    .iter()
                    .map(|s| ReportValue::Document(s.to_document()))
                    .collect(),
            ),
            NormsMode::Last | NormsMode::LastSpectral => selected
                .first()
                .map(|s| ReportValue::Document(s.to_document()))
                .unwrap_or_default(),
        };
        ReportDocument::new()
            .with("Number of steps", norms.len())
            .with(summary_key(self.options.mode, self.options.normstype), value)
    }

    fn parsed(&self) -> Result<&NormsSet, ComparatorError> {
        self.norms.as_ref().ok_or_else(|| ComparatorError::Failed {
            kind: self.settings.kind.clone(),
            message: format!("listing '{}' has not been parsed", self.options.output),
        })
    }

    /// Full comparison of the two listings, step by step.
    fn compare_with_listing(&self, reference: &ReferenceResource) -> Result<ReportDocument, ComparatorError> {
        let path = reference.resolve(&self.work_dir);
        info!(kind = %self.settings.kind, reference = %path.display(), "Comparing norms with reference listing");
        let reference_norms = self.opener.open(&path)?.parse_norms()?;
        let test = self.parsed()?;
        let cmp = compare_snapshots(&test.snapshots, &reference_norms.snapshots);
        Ok(cmp.to_document(self.options.digits4validation))
    }

    /// Comparison of the selected norms with those recorded in the
    /// reference task summary.
    fn compare_with_summary(&self, reference: &ReferenceResource) -> Result<ReportDocument, ComparatorError> {
        let path = reference.resolve(&self.work_dir);
        info!(kind = %self.settings.kind, reference = %path.display(), "Comparing norms with reference task summary");
        let summary = ReportDocument::load(&path)?;
        let key = summary_key(self.options.mode, self.options.normstype);
        let section = summary
            .get_document(&self.settings.kind)
            .and_then(|s| s.get(&key))
            .ok_or_else(|| ComparatorError::NoReference {
                kind: self.settings.kind.clone(),
                message: format!("no '{key}' in reference task summary {}", path.display()),
            })?;
        let reference_snapshots = snapshots_from_value(section)?;
        let test = self
            .parsed()?
            .select(self.options.mode, self.options.normstype);
        let cmp = compare_snapshots(&test, &reference_snapshots);
        Ok(cmp.to_document(self.options.digits4validation))
    }
}

fn snapshots_from_value(value: &ReportValue) -> Result<Vec<NormsSnapshot>, DiffError> {
    match value {
        ReportValue::Null => Ok(Vec::new()),
        ReportValue::Document(doc) => Ok(vec![NormsSnapshot::from_document(doc)?]),
        ReportValue::List(items) => items
            .iter()
            .map(|item| {
                item.as_document()
                    .ok_or_else(|| DiffError::NormsSummary(format!("expected a snapshot, found {}", item.type_name())))
                    .and_then(NormsSnapshot::from_document)
            })
            .collect(),
        other => Err(DiffError::NormsSummary(format!(
            "expected snapshots, found {}",
            other.type_name()
        ))),
    }
}

impl Comparator for NormsComparator {
    fn kind(&self) -> &str {
        &self.settings.kind
    }

    fn side_expert(&self) -> bool {
        self.settings.side_expert
    }

    fn fatal_exceptions(&self) -> bool {
        self.settings.fatal_exceptions
    }

    fn parse(&mut self) -> Result<ReportDocument, ComparatorError> {
        let path = self.work_dir.join(&self.options.output);
        let norms = self.opener.open(&path)?.parse_norms()?;
        info!(kind = %self.settings.kind, steps = norms.len(), "Parsed norms");
        let summary = self.summary(&norms);
        self.norms = Some(norms);
        Ok(summary)
    }

    fn compare(&self, references: &[ReferenceResource]) -> Result<ReportDocument, ComparatorError> {
        if let Some(listing) = of_kinds(references, &[LISTING_KIND]).next() {
            return self.compare_with_listing(listing);
        }
        if let Some(summary) = of_kinds(references, &[TASKINFO_KIND]).next() {
            return self.compare_with_summary(summary);
        }
        no_adequate_reference(&self.settings, &[LISTING_KIND, TASKINFO_KIND])
    }
}
