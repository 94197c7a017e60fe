//! Norms records: ordered snapshots of named norm groups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verdict_core::errors::DiffError;
use verdict_core::report::{ReportDocument, ReportValue};

pub const SPECTRAL_GROUP: &str = "spnorms";
pub const GRIDPOINT_GROUP: &str = "gpnorms";

/// Norms printed at one step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormsSnapshot {
    pub step: u32,
    /// Group name → norm name → value.
    pub groups: BTreeMap<String, BTreeMap<String, f64>>,
}

impl NormsSnapshot {
    pub fn new(step: u32) -> Self {
        Self {
            step,
            groups: BTreeMap::new(),
        }
    }

    pub fn with_norm(mut self, group: &str, name: &str, value: f64) -> Self {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
        self
    }

    pub fn has_spectral(&self) -> bool {
        self.groups.get(SPECTRAL_GROUP).is_some_and(|g| !g.is_empty())
    }

    /// Copy keeping only the groups selected by `normstype`, or `None`
    /// when nothing is left.
    pub fn filtered(&self, normstype: NormsType) -> Option<Self> {
        let groups: BTreeMap<_, _> = self
            .groups
            .iter()
            .filter(|(name, norms)| !norms.is_empty() && normstype.includes(name))
            .map(|(name, norms)| (name.clone(), norms.clone()))
            .collect();
        (!groups.is_empty()).then(|| Self {
            step: self.step,
            groups,
        })
    }

    /// `{"step": n, group: {norm: value}}`, empty groups left out.
    pub fn to_document(&self) -> ReportDocument {
        let mut doc = ReportDocument::new().with("step", self.step);
        for (group, norms) in &self.groups {
            if norms.is_empty() {
                continue;
            }
            let norms: ReportDocument = norms.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            doc.set(group.as_str(), norms);
        }
        doc
    }

    pub fn from_document(doc: &ReportDocument) -> Result<Self, DiffError> {
        let step = doc
            .get("step")
            .and_then(ReportValue::as_i64)
            .and_then(|s| u32::try_from(s).ok())
            .ok_or_else(|| DiffError::NormsSummary("snapshot without a valid 'step'".to_string()))?;
        let mut snapshot = Self::new(step);
        for (group, value) in doc.iter().filter(|(k, _)| *k != "step") {
            let norms = value.as_document().ok_or_else(|| {
                DiffError::NormsSummary(format!("group '{group}' of step {step} is not a document"))
            })?;
            let mut values = BTreeMap::new();
            for (name, v) in norms.iter() {
                let v = v.as_f64().ok_or_else(|| {
                    DiffError::NormsSummary(format!("norm '{group}/{name}' of step {step} is not a number"))
                })?;
                values.insert(name.to_string(), v);
            }
            snapshot.groups.insert(group.to_string(), values);
        }
        Ok(snapshot)
    }
}

/// All the snapshots of a listing, in print order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormsSet {
    pub snapshots: Vec<NormsSnapshot>,
}

impl NormsSet {
    pub fn new(snapshots: Vec<NormsSnapshot>) -> Self {
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last(&self) -> Option<&NormsSnapshot> {
        self.snapshots.last()
    }

    pub fn last_spectral(&self) -> Option<&NormsSnapshot> {
        self.snapshots.iter().rev().find(|s| s.has_spectral())
    }

    /// Snapshots selected by `mode`, restricted to the groups of `normstype`.
    /// The selection is made before the restriction: `last_spectral` with
    /// grid-point norms yields the grid-point norms of the last spectral step.
    pub fn select(&self, mode: NormsMode, normstype: NormsType) -> Vec<NormsSnapshot> {
        let selected: Vec<&NormsSnapshot> = match mode {
            NormsMode::All => self.snapshots.iter().collect(),
            NormsMode::Last => self.last().into_iter().collect(),
            NormsMode::LastSpectral => self.last_spectral().into_iter().collect(),
        };
        selected
            .into_iter()
            .filter_map(|s| s.filtered(normstype))
            .collect()
    }
}

/// Which snapshots are compared against a reference summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormsMode {
    All,
    Last,
    #[default]
    LastSpectral,
}

impl NormsMode {
    pub fn summary_key(&self) -> &'static str {
        match self {
            Self::All => "_Norms at each step",
            Self::Last => "Last step norms",
            Self::LastSpectral => "Last step with spectral norms",
        }
    }
}

/// Which norm groups are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormsType {
    #[serde(rename = "spnorms")]
    SpNorms,
    #[serde(rename = "gpnorms")]
    GpNorms,
    #[serde(rename = "both")]
    #[default]
    Both,
}

impl NormsType {
    pub fn includes(&self, group: &str) -> bool {
        match self {
            Self::SpNorms => group == SPECTRAL_GROUP,
            Self::GpNorms => group == GRIDPOINT_GROUP,
            Self::Both => true,
        }
    }

    pub fn key_suffix(&self) -> &'static str {
        match self {
            Self::SpNorms => " (spnorms only)",
            Self::GpNorms => " (gpnorms only)",
            Self::Both => "",
        }
    }
}

/// Summary key of the selected norms, e.g. `Last step norms (gpnorms only)`.
pub fn summary_key(mode: NormsMode, normstype: NormsType) -> String {
    format!("{}{}", mode.summary_key(), normstype.key_suffix())
}
