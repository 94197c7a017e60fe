//! The comparator trait and the settings shared by every comparator.

use verdict_core::config::ComparatorSpec;
use verdict_core::errors::ComparatorError;
use verdict_core::report::{keys, ReportDocument};
use verdict_core::status::StatusCode;

use crate::references::ReferenceResource;

/// A comparator: parses the task outputs it is in charge of into a summary,
/// then compares them against reference resources.
///
/// The result of `compare` may carry `Validated`, `Validated means`,
/// `Comparison`, `comparisonStatus` and `mainMetrics`; see
/// [`StatusAggregator`](crate::aggregation::StatusAggregator) for how they
/// are ranked.
pub trait Comparator: Send + Sync {
    /// Unique kind within a panel.
    fn kind(&self) -> &str;

    /// A side comparator is reported but never drives the verdict.
    fn side_expert(&self) -> bool;

    /// Whether errors of this comparator abort the run.
    fn fatal_exceptions(&self) -> bool;

    /// Parse the task outputs and return their summary.
    fn parse(&mut self) -> Result<ReportDocument, ComparatorError>;

    /// Compare the parsed outputs against `references`.
    fn compare(&self, references: &[ReferenceResource]) -> Result<ReportDocument, ComparatorError>;
}

/// Identity and flags of a comparator, resolved from its spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparatorSettings {
    pub kind: String,
    pub side_expert: bool,
    pub fatal_exceptions: bool,
}

impl ComparatorSettings {
    pub fn from_spec(spec: &ComparatorSpec) -> Self {
        Self {
            kind: spec.kind.clone(),
            side_expert: spec.effective_side_expert(),
            fatal_exceptions: spec.effective_fatal_exceptions(),
        }
    }
}

/// Result of a comparator that found no reference of a kind it accepts:
/// an error when fatal, else a `0` status document.
pub(crate) fn no_adequate_reference(
    settings: &ComparatorSettings,
    accepted: &[&str],
) -> Result<ReportDocument, ComparatorError> {
    let message = format!(
        "No adequate reference available (kind in [{}])",
        accepted.join(", ")
    );
    if settings.fatal_exceptions {
        return Err(ComparatorError::NoReference {
            kind: settings.kind.clone(),
            message,
        });
    }
    tracing::warn!(kind = %settings.kind, "{message}");
    Ok(ReportDocument::new().with(
        keys::COMPARISON_STATUS,
        StatusCode::no_adequate_reference(message).to_document(),
    ))
}
