//! Status codes: comparison statuses per category and task statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::ReportDocument;

/// Severity scale of comparison statuses, lowest to highest.
/// The derived ordering follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusSymbol {
    /// `-`: no comparator could state.
    #[serde(rename = "-")]
    NoComparator,
    /// `0`: no reference available.
    #[serde(rename = "0")]
    NoReference,
    /// `?`: comparator present but silent on validation.
    #[serde(rename = "?")]
    Unknown,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "KO")]
    Ko,
    /// `!`: technical comparison failure.
    #[serde(rename = "!")]
    ComparisonIssue,
    /// `+`: the reference run itself crashed.
    #[serde(rename = "+")]
    ReferenceCrashed,
}

impl StatusSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoComparator => "-",
            Self::NoReference => "0",
            Self::Unknown => "?",
            Self::Ok => "OK",
            Self::Ko => "KO",
            Self::ComparisonIssue => "!",
            Self::ReferenceCrashed => "+",
        }
    }

    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::NoComparator),
            "0" => Some(Self::NoReference),
            "?" => Some(Self::Unknown),
            "OK" => Some(Self::Ok),
            "KO" => Some(Self::Ko),
            "!" => Some(Self::ComparisonIssue),
            "+" => Some(Self::ReferenceCrashed),
            _ => None,
        }
    }

    pub fn all() -> &'static [StatusSymbol] {
        &[
            Self::NoComparator,
            Self::NoReference,
            Self::Unknown,
            Self::Ok,
            Self::Ko,
            Self::ComparisonIssue,
            Self::ReferenceCrashed,
        ]
    }
}

impl fmt::Display for StatusSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison status `{symbol, short, text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    pub symbol: StatusSymbol,
    pub short: String,
    pub text: String,
}

impl StatusCode {
    pub fn new(symbol: StatusSymbol, short: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            symbol,
            short: short.into(),
            text: text.into(),
        }
    }

    pub fn no_comparator() -> Self {
        Self::new(StatusSymbol::NoComparator, "- No expert -", "No expert available")
    }

    pub fn no_reference() -> Self {
        Self::new(StatusSymbol::NoReference, "- No ref -", "No reference to be compared to")
    }

    /// No reference, with a comparator-specific explanation.
    pub fn no_adequate_reference(text: impl Into<String>) -> Self {
        Self::new(StatusSymbol::NoReference, "- No ref -", text)
    }

    pub fn unknown() -> Self {
        Self::new(
            StatusSymbol::Unknown,
            "? Unknown ?",
            "To be checked: expert has not stated about Validation",
        )
    }

    pub fn ok(validated_means: &str) -> Self {
        Self::new(StatusSymbol::Ok, "OK", format!("Success: \"{validated_means}\""))
    }

    pub fn ko(validated_means: &str) -> Self {
        Self::new(
            StatusSymbol::Ko,
            "KO",
            format!("Fail: \"{validated_means}\" is False"),
        )
    }

    pub fn comparison_issue() -> Self {
        Self::new(
            StatusSymbol::ComparisonIssue,
            "! Comp Issue !",
            "To be checked: at least one technical problem occurred in comparison",
        )
    }

    pub fn reference_crashed(text: impl Into<String>) -> Self {
        Self::new(StatusSymbol::ReferenceCrashed, "+ Ref crashed +", text)
    }

    pub fn to_document(&self) -> ReportDocument {
        ReportDocument::new()
            .with("symbol", self.symbol.as_str())
            .with("short", self.short.as_str())
            .with("text", self.text.as_str())
    }

    /// Read a status back from a document. Returns `None` when the document
    /// does not carry a recognized `symbol`.
    pub fn from_document(doc: &ReportDocument) -> Option<Self> {
        let symbol = StatusSymbol::parse(doc.get_str("symbol")?)?;
        Some(Self {
            symbol,
            short: doc.get_str("short").unwrap_or(symbol.as_str()).to_string(),
            text: doc.get_str("text").unwrap_or_default().to_string(),
        })
    }
}

/// Outcome of the task itself, recorded in the task summary under `Status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// `E`: the task ended without crash.
    Ended,
    /// `X`: the task ended abnormally.
    Crashed,
    /// `X=R`: the task ended abnormally, as in the reference.
    CrashedAsReference,
}

impl TaskStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Ended => "E",
            Self::Crashed => "X",
            Self::CrashedAsReference => "X=R",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            Self::Ended => "Ended",
            Self::Crashed => "Crashed",
            Self::CrashedAsReference => "Crashed as Ref",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Ended => "Ended: Task ended without crash.",
            Self::Crashed => "Crashed: the task ended abnormally, with associated exception",
            Self::CrashedAsReference => "Crashed: AS IN REFERENCE, the task ended abnormally",
        }
    }

    pub fn to_document(&self) -> ReportDocument {
        ReportDocument::new()
            .with("symbol", self.symbol())
            .with("short", self.short())
            .with("text", self.text())
    }
}
