//! Fields comparator: compares the fields of output files with those of
//! reference files.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use verdict_core::config::ComparatorSpec;
use verdict_core::constants::{DEFAULT_FIELD_FILE_PATTERNS, FIELD_FILE_KINDS, NORMALIZED_FIELDS_DIFF};
use verdict_core::errors::{ComparatorError, DiffError};
use verdict_core::report::{keys, ReportDocument};

use super::context::ComparatorContext;
use super::types::{no_adequate_reference, Comparator, ComparatorSettings};
use crate::fields::{
    compare_sources, make_pairs, FieldSource, FieldSourceOpener, FieldsDiffOptions, FilePair,
    FileComparison, FileResult, FileSetSummary, Pairing,
};
use crate::references::{of_kinds, ReferenceResource};

/// Options of the `fields_in_file` comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldsOptions {
    /// Output files to compare. Empty: pair from the references, and
    /// discover files with `patterns` at parse time.
    pub filenames: Vec<String>,
    pub validate_if_bit_repro_only: bool,
    pub normalized_validation_threshold: f64,
    pub ignore_meta: bool,
    pub ignore_orphan_fields: bool,
    pub hide_bit_repro_fields: bool,
    /// Per-field `{min, avg, max}` in the parse summary.
    pub compute_stats: bool,
    /// Compare file pairs on the rayon pool.
    pub parallel: bool,
    pub patterns: Vec<String>,
}

impl Default for FieldsOptions {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            validate_if_bit_repro_only: true,
            normalized_validation_threshold: NORMALIZED_FIELDS_DIFF,
            ignore_meta: false,
            ignore_orphan_fields: false,
            hide_bit_repro_fields: true,
            compute_stats: false,
            parallel: false,
            patterns: DEFAULT_FIELD_FILE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FieldsOptions {
    pub fn diff_options(&self, fatal_exceptions: bool) -> FieldsDiffOptions {
        FieldsDiffOptions {
            ignore_meta: self.ignore_meta,
            ignore_orphan_fields: self.ignore_orphan_fields,
            hide_bit_repro_fields: self.hide_bit_repro_fields,
            validate_if_bit_repro_only: self.validate_if_bit_repro_only,
            normalized_validation_threshold: self.normalized_validation_threshold,
            fatal_exceptions,
        }
    }
}

pub struct FieldSetComparator {
    settings: ComparatorSettings,
    options: FieldsOptions,
    work_dir: PathBuf,
    opener: Arc<dyn FieldSourceOpener>,
}

impl FieldSetComparator {
    pub const KIND: &'static str = "fields_in_file";

    pub fn new(settings: ComparatorSettings, options: FieldsOptions, ctx: &ComparatorContext) -> Self {
        Self {
            settings,
            options,
            work_dir: ctx.work_dir.clone(),
            opener: Arc::clone(&ctx.field_opener),
        }
    }

    /// Registry constructor.
    pub fn from_spec(
        spec: &ComparatorSpec,
        ctx: &ComparatorContext,
    ) -> Result<Box<dyn Comparator>, ComparatorError> {
        let options: FieldsOptions = spec
            .options_as()
            .map_err(|e| ComparatorError::InvalidOptions {
                kind: spec.kind.clone(),
                message: e.to_string(),
            })?;
        let threshold = options.normalized_validation_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ComparatorError::InvalidOptions {
                kind: spec.kind.clone(),
                message: "normalized_validation_threshold must be positive".to_string(),
            });
        }
        Ok(Box::new(Self::new(ComparatorSettings::from_spec(spec), options, ctx)))
    }

    pub fn options(&self) -> &FieldsOptions {
        &self.options
    }

    /// Files to parse: the configured ones that exist, or those discovered.
    /// Missing configured files are returned apart in non-fatal mode.
    fn files_to_parse(&self) -> Result<(Vec<String>, Vec<String>), ComparatorError> {
        if self.options.filenames.is_empty() {
            let found = self.opener.discover(&self.work_dir, &self.options.patterns);
            return Ok((found, Vec::new()));
        }
        let mut files = Vec::with_capacity(self.options.filenames.len());
        let mut skipped = Vec::new();
        for name in &self.options.filenames {
            let path = self.work_dir.join(name);
            if self.opener.exists(&path) {
                files.push(name.clone());
                continue;
            }
            let err = ComparatorError::OutputNotFound {
                path: path.display().to_string(),
            };
            if self.settings.fatal_exceptions {
                return Err(err);
            }
            warn!(kind = %self.settings.kind, error = %err, "Skipping output file");
            skipped.push(err.to_string());
        }
        Ok((files, skipped))
    }

    fn file_summary(&self, source: &dyn FieldSource) -> Result<ReportDocument, DiffError> {
        let ids: Vec<_> = source
            .list_field_identities()
            .filter(|id| !id.is_skipped())
            .collect();
        let mut summary = ReportDocument::new().with("Number of fields", ids.len());
        if !self.options.compute_stats {
            return Ok(summary);
        }
        let mut stats = ReportDocument::new();
        for id in &ids {
            let mut field = source.read_field(id)?;
            if field.spectral {
                match source.to_gridpoint(id, field) {
                    Ok(gp) => field = gp,
                    Err(e) => {
                        debug!(field = %id, error = %e, "No stats for spectral field");
                        continue;
                    }
                }
            }
            if let Some((min, avg, max)) = field.data.stats() {
                stats.set(
                    id.to_string(),
                    ReportDocument::new()
                        .with("min", min)
                        .with("avg", avg)
                        .with("max", max),
                );
            }
        }
        summary.set("Stats", stats);
        Ok(summary)
    }

    fn compare_pair(&self, pair: &FilePair) -> Result<FileComparison, DiffError> {
        info!(
            kind = %self.settings.kind,
            test = %pair.test,
            reference = %pair.reference_path.display(),
            "Comparing fields"
        );
        let test = self.opener.open(&pair.test_path)?;
        let reference = self.opener.open(&pair.reference_path)?;
        let options = self.options.diff_options(self.settings.fatal_exceptions);
        compare_sources(test.as_ref(), reference.as_ref(), &options)
    }
}

impl Comparator for FieldSetComparator {
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
        let (names, skipped) = self.files_to_parse()?;
        let mut files = ReportDocument::new();
        for name in &names {
            let source = self.opener.open(&self.work_dir.join(name))?;
            files.set(name.as_str(), self.file_summary(source.as_ref())?);
        }
        info!(kind = %self.settings.kind, files = names.len(), "Parsed field files");
        let mut summary = ReportDocument::new()
            .with("Number of files", names.len())
            .with("Files", files);
        annotate_skipped(&mut summary, skipped);
        Ok(summary)
    }

    fn compare(&self, references: &[ReferenceResource]) -> Result<ReportDocument, ComparatorError> {
        let accepted: Vec<&ReferenceResource> = of_kinds(references, FIELD_FILE_KINDS).collect();
        if accepted.is_empty() {
            return no_adequate_reference(&self.settings, FIELD_FILE_KINDS);
        }
        let fatal = self.settings.fatal_exceptions;
        let Pairing { pairs, skipped } = make_pairs(
            &self.options.filenames,
            &accepted,
            &self.work_dir,
            self.opener.as_ref(),
            fatal,
        )?;
        if pairs.is_empty() {
            warn!(kind = %self.settings.kind, "No file pair to compare");
            let mut doc = no_adequate_reference(&self.settings, FIELD_FILE_KINDS)?;
            annotate_skipped(&mut doc, skipped);
            return Ok(doc);
        }

        let mut raw: HashMap<String, Result<FileComparison, DiffError>> = if self.options.parallel {
            pairs
                .par_iter()
                .map(|pair| (pair.test.clone(), self.compare_pair(pair)))
                .collect()
        } else {
            pairs
                .iter()
                .map(|pair| (pair.test.clone(), self.compare_pair(pair)))
                .collect()
        };

        let mut results: HashMap<String, FileResult> = HashMap::with_capacity(pairs.len());
        for pair in &pairs {
            match raw.remove(&pair.test) {
                Some(Ok(file)) => {
                    results.insert(pair.test.clone(), Ok(file));
                }
                Some(Err(e)) if fatal => return Err(e.into()),
                Some(Err(e)) => {
                    warn!(kind = %self.settings.kind, test = %pair.test, error = %e, "File comparison failed");
                    results.insert(pair.test.clone(), Err(e.to_string()));
                }
                None => {}
            }
        }

        let summary = FileSetSummary::from_results(&pairs, &results);
        let mut doc = summary.to_document(&pairs, &results);
        annotate_skipped(&mut doc, skipped);
        Ok(doc)
    }
}

/// Files left out in non-fatal mode are listed under `Warnings`.
fn annotate_skipped(doc: &mut ReportDocument, skipped: Vec<String>) {
    if !skipped.is_empty() {
        doc.set(keys::WARNINGS, skipped);
    }
}
