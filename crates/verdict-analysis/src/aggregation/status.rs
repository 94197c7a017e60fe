//! Merges the results of a comparator panel into one status per category.

use verdict_core::report::{keys, ReportDocument, ReportValue};
use verdict_core::status::{StatusCode, StatusSymbol};

/// A panel member as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMember {
    pub kind: String,
    pub side_expert: bool,
}

impl PanelMember {
    pub fn new(kind: impl Into<String>, side_expert: bool) -> Self {
        Self {
            kind: kind.into(),
            side_expert,
        }
    }
}

/// Status of a category and the comparator entries to remove from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub status: StatusCode,
    /// Set when a crashed reference wins: every other comparator entry.
    pub discarded: Vec<String>,
}

/// Ranks comparator results on the severity scale
/// `- < 0 < ? < OK < KO < ! < +`.
pub struct StatusAggregator;

impl StatusAggregator {
    /// Status of a category holding one result per comparator kind.
    ///
    /// A crashed reference wins over everything. Otherwise the running
    /// status starts at `-` and is replaced by each non-side comparator
    /// status of equal or higher rank; two `OK` or two `KO` have their texts
    /// joined. Never fails.
    pub fn aggregate(panel: &[PanelMember], category: &ReportDocument) -> Aggregation {
        if category.is_empty() {
            return Aggregation {
                status: StatusCode::no_reference(),
                discarded: Vec::new(),
            };
        }

        let crashed = panel.iter().find_map(|member| {
            category
                .get_document(&member.kind)
                .and_then(Self::crashed_reference)
                .map(|status| (member, status))
        });
        if let Some((offender, status)) = crashed {
            let discarded = panel
                .iter()
                .filter(|m| m.kind != offender.kind && category.contains_key(&m.kind))
                .map(|m| m.kind.clone())
                .collect();
            return Aggregation { status, discarded };
        }

        let mut running = StatusCode::no_comparator();
        for member in panel.iter().filter(|m| !m.side_expert) {
            let status = match category.get_document(&member.kind) {
                Some(result) => Self::comparator_status(result),
                None => StatusCode::unknown(),
            };
            if status.symbol < running.symbol {
                continue;
            }
            let joinable = matches!(status.symbol, StatusSymbol::Ok | StatusSymbol::Ko);
            if joinable && status.symbol == running.symbol {
                running.text = format!("{} | {}", running.text, status.text);
            } else {
                running = status;
            }
        }
        Aggregation {
            status: running,
            discarded: Vec::new(),
        }
    }

    /// Status stated by a single comparator result.
    pub fn comparator_status(result: &ReportDocument) -> StatusCode {
        let means = result.get_str(keys::VALIDATED_MEANS).unwrap_or_default();
        match result.get(keys::VALIDATED) {
            Some(ReportValue::Bool(true)) => return StatusCode::ok(means),
            Some(ReportValue::Bool(false)) => return StatusCode::ko(means),
            _ => {}
        }
        if result.get_str(keys::COMPARISON) == Some(keys::COMPARISON_FAILED) {
            return StatusCode::comparison_issue();
        }
        match result
            .get_document(keys::COMPARISON_STATUS)
            .and_then(StatusCode::from_document)
        {
            Some(status) if status.symbol == StatusSymbol::NoReference => status,
            _ => StatusCode::unknown(),
        }
    }

    /// A crashed-reference status, carried either by the result itself or
    /// by its `comparisonStatus`.
    fn crashed_reference(result: &ReportDocument) -> Option<StatusCode> {
        let own = StatusCode::from_document(result);
        let nested = || {
            result
                .get_document(keys::COMPARISON_STATUS)
                .and_then(StatusCode::from_document)
        };
        own.or_else(nested)
            .filter(|s| s.symbol == StatusSymbol::ReferenceCrashed)
    }

    /// The configured lead, or the only non-side comparator if there is
    /// exactly one.
    pub fn select_lead(configured: Option<&str>, panel: &[PanelMember]) -> Option<String> {
        if let Some(lead) = configured {
            return Some(lead.to_string());
        }
        let mut candidates = panel.iter().filter(|m| !m.side_expert);
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only.kind.clone()),
            _ => None,
        }
    }
}
