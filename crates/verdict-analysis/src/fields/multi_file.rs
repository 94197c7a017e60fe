//! Aggregation of file comparisons over a set of file pairs.

use std::collections::HashMap;

use verdict_core::report::{keys, ReportDocument};

use super::pairing::FilePair;
use super::types::{format_percent, FileComparison, MAX_NORMALIZED_DIFF};

/// Result of one file pair: a comparison, or the message of the error
/// that prevented it.
pub type FileResult = Result<FileComparison, String>;

/// Overall outcome of a set of file pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSetSummary {
    pub validated: bool,
    pub bit_reproducible: bool,
    /// From the first file pair.
    pub validated_means: Option<String>,
    pub max_normalized_diff: f64,
    /// A file pair or a field could not be compared.
    pub technical_failure: bool,
}

impl FileSetSummary {
    /// Fold the results of `pairs`, taken in pairing order.
    pub fn from_results(pairs: &[FilePair], results: &HashMap<String, FileResult>) -> Self {
        let mut summary = Self {
            validated: true,
            bit_reproducible: true,
            validated_means: None,
            max_normalized_diff: 0.0,
            technical_failure: false,
        };
        for pair in pairs {
            match results.get(&pair.test) {
                Some(Ok(file)) => {
                    summary.validated &= file.validated;
                    summary.bit_reproducible &= file.bit_reproducible;
                    summary.max_normalized_diff = summary.max_normalized_diff.max(file.max_normalized_diff);
                    summary.technical_failure |= file.has_failures();
                    if summary.validated_means.is_none() {
                        summary.validated_means = Some(file.validated_means.clone());
                    }
                }
                Some(Err(_)) | None => {
                    summary.validated = false;
                    summary.bit_reproducible = false;
                    summary.technical_failure = true;
                }
            }
        }
        summary
    }

    /// Report document of the whole set, per-file documents keyed by test
    /// file name. On technical failure, `Validated` is replaced by
    /// `Comparison: "Failed"`.
    pub fn to_document(&self, pairs: &[FilePair], results: &HashMap<String, FileResult>) -> ReportDocument {
        let mut doc = ReportDocument::new();
        if self.technical_failure {
            doc.set(keys::COMPARISON, keys::COMPARISON_FAILED);
        } else {
            doc.set(keys::VALIDATED, self.validated);
        }
        doc.set(keys::BIT_REPRODUCIBLE, self.bit_reproducible);
        if let Some(means) = &self.validated_means {
            doc.set(keys::VALIDATED_MEANS, means.as_str());
        }
        doc.set(keys::MAIN_METRICS, MAX_NORMALIZED_DIFF);
        doc.set(MAX_NORMALIZED_DIFF, format_percent(self.max_normalized_diff));

        for pair in pairs {
            let file_doc = match results.get(&pair.test) {
                Some(Ok(file)) => file.to_document(),
                Some(Err(message)) => ReportDocument::new()
                    .with(keys::COMPARISON, keys::COMPARISON_FAILED)
                    .with(keys::ERROR, message.as_str()),
                None => continue,
            };
            doc.set(pair.test.as_str(), file_doc);
        }
        doc
    }
}
