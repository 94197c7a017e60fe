//! Field comparison types: identities, data arrays, descriptors and
//! per-field / per-file comparison outcomes.

use std::collections::BTreeMap;
use std::fmt;

use verdict_core::constants::SKIPPED_FIELD_PREFIX;
use verdict_core::report::{keys, ReportDocument, ReportValue};

/// Identity of a field within a source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    /// Plain field name, e.g. `S090TEMPERATURE`.
    Name(String),
    /// Structured handle, e.g. GRIB keys.
    Handle(BTreeMap<String, String>),
}

impl FieldId {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn handle<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Handle(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(n) => Some(n),
            Self::Handle(_) => None,
        }
    }

    /// Internal buffers that are never compared.
    pub fn is_skipped(&self) -> bool {
        self.as_name()
            .is_some_and(|n| n.starts_with(SKIPPED_FIELD_PREFIX))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => f.write_str(n),
            Self::Handle(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for FieldId {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<String> for FieldId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Float(Vec<f64>),
    Integer(Vec<i64>),
}

/// A materialized field array: flat values in row-major order, a shape and
/// an optional mask where `true` marks an undefined element.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    pub shape: Vec<usize>,
    pub values: FieldValues,
    pub mask: Option<Vec<bool>>,
}

impl FieldData {
    pub fn float(shape: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            shape,
            values: FieldValues::Float(values),
            mask: None,
        }
    }

    pub fn integer(shape: Vec<usize>, values: Vec<i64>) -> Self {
        Self {
            shape,
            values: FieldValues::Integer(values),
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn len(&self) -> usize {
        match &self.values {
            FieldValues::Float(v) => v.len(),
            FieldValues::Integer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_float(&self) -> bool {
        matches!(self.values, FieldValues::Float(_))
    }

    pub fn value(&self, i: usize) -> f64 {
        match &self.values {
            FieldValues::Float(v) => v[i],
            FieldValues::Integer(v) => v[i] as f64,
        }
    }

    pub fn is_defined(&self, i: usize) -> bool {
        match &self.mask {
            Some(mask) => !mask.get(i).copied().unwrap_or(false),
            None => true,
        }
    }

    /// Mask with every element made explicit.
    pub fn full_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|i| !self.is_defined(i)).collect()
    }

    /// Defined values, in order.
    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len())
            .filter(|&i| self.is_defined(i))
            .map(|i| self.value(i))
    }

    /// `(min, avg, max)` over defined values, or `None` if none is defined.
    pub fn stats(&self) -> Option<(f64, f64, f64)> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for x in self.defined_values() {
            count += 1;
            sum += x;
            min = min.min(x);
            max = max.max(x);
        }
        (count > 0).then(|| (min, sum / count as f64, max))
    }
}

/// Temporal or spatial metadata of a field, compared structurally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor(pub ReportDocument);

impl Descriptor {
    pub fn new(doc: ReportDocument) -> Self {
        Self(doc)
    }

    /// Leaves that differ between `self` (test) and `other` (reference),
    /// as `{key: {test, ref}}` nested like the descriptors.
    /// `None` when both are identical.
    pub fn recursive_diff(&self, other: &Descriptor) -> Option<ReportDocument> {
        document_diff(&self.0, &other.0)
    }
}

fn document_diff(test: &ReportDocument, reference: &ReportDocument) -> Option<ReportDocument> {
    let mut diff = ReportDocument::new();
    for (key, t) in test.iter() {
        match (t, reference.get(key)) {
            (ReportValue::Document(td), Some(ReportValue::Document(rd))) => {
                if let Some(sub) = document_diff(td, rd) {
                    diff.set(key, sub);
                }
            }
            (t, Some(r)) if t == r => {}
            (t, r) => {
                diff.set(key, leaf_diff(t.clone(), r.cloned().unwrap_or_default()));
            }
        }
    }
    for (key, r) in reference.iter() {
        if !test.contains_key(key) {
            diff.set(key, leaf_diff(ReportValue::Null, r.clone()));
        }
    }
    (!diff.is_empty()).then_some(diff)
}

fn leaf_diff(test: ReportValue, reference: ReportValue) -> ReportDocument {
    ReportDocument::new().with("test", test).with("ref", reference)
}

/// A field as read from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub data: FieldData,
    /// `None` for fields without temporal metadata.
    pub validity: Option<Descriptor>,
    /// `None` for fields without spatial metadata.
    pub geometry: Option<Descriptor>,
    /// Data is stored as spectral coefficients.
    pub spectral: bool,
}

impl FieldValue {
    pub fn new(data: FieldData) -> Self {
        Self {
            data,
            validity: None,
            geometry: None,
            spectral: false,
        }
    }

    pub fn with_validity(mut self, validity: ReportDocument) -> Self {
        self.validity = Some(Descriptor(validity));
        self
    }

    pub fn with_geometry(mut self, geometry: ReportDocument) -> Self {
        self.geometry = Some(Descriptor(geometry));
        self
    }

    pub fn spectral(mut self) -> Self {
        self.spectral = true;
        self
    }
}

/// Normalized distance between test and reference data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedDiff {
    pub bias: f64,
    pub std: f64,
    pub errmax: f64,
}

impl NormalizedDiff {
    pub fn to_document(&self) -> ReportDocument {
        ReportDocument::new()
            .with("bias", self.bias)
            .with("std", self.std)
            .with("errmax", self.errmax)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataDiff {
    /// Data is bit-reproducible, nothing to measure.
    NotComputed,
    /// Shapes differ.
    DimensionsDiffer,
    Computed(NormalizedDiff),
}

/// Outcome of comparing one field with its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub validated: bool,
    pub data_bit_repro: bool,
    /// Metadata was compared (not ignored, present on both sides).
    pub metadata_compared: bool,
    pub validity_diff: Option<ReportDocument>,
    pub geometry_diff: Option<ReportDocument>,
    pub data_diff: DataDiff,
    pub mask_is_common: Option<bool>,
}

impl FieldComparison {
    pub fn is_bit_reproducible(&self) -> bool {
        self.data_bit_repro && self.validity_diff.is_none() && self.geometry_diff.is_none()
    }

    pub fn max_normalized_error(&self) -> f64 {
        match self.data_diff {
            DataDiff::Computed(d) => d.errmax,
            _ => 0.0,
        }
    }

    pub fn to_document(&self) -> ReportDocument {
        let mut doc = ReportDocument::new();
        if self.metadata_compared {
            doc.set("Validity diff", optional_document(&self.validity_diff));
            doc.set("Geometry diff", optional_document(&self.geometry_diff));
        }
        match self.data_diff {
            DataDiff::NotComputed => {}
            DataDiff::DimensionsDiffer => {
                doc.set(
                    "Normalized data diff",
                    "Comparison not possible: dimensions differ",
                );
            }
            DataDiff::Computed(d) => {
                doc.set("Normalized data diff", d.to_document());
            }
        }
        doc.set("Data bit-repro", self.data_bit_repro);
        if let Some(common) = self.mask_is_common {
            doc.set("Mask is common", common);
        }
        doc.set(keys::VALIDATED, self.validated);
        doc
    }
}

fn optional_document(doc: &Option<ReportDocument>) -> ReportValue {
    doc.clone().map(ReportValue::Document).unwrap_or_default()
}

/// Outcome of one common field within a file comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Compared(FieldComparison),
    /// The comparison raised; the message is kept.
    Failed(String),
}

impl FieldOutcome {
    pub fn validated(&self) -> bool {
        matches!(self, Self::Compared(c) if c.validated)
    }

    pub fn bit_reproducible(&self) -> bool {
        matches!(self, Self::Compared(c) if c.is_bit_reproducible())
    }

    pub fn max_normalized_error(&self) -> f64 {
        match self {
            Self::Compared(c) => c.max_normalized_error(),
            Self::Failed(_) => 0.0,
        }
    }
}

/// Outcome of comparing the fields of one test file with its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FileComparison {
    /// Common fields, in comparison order.
    pub fields: Vec<(FieldId, FieldOutcome)>,
    pub new_fields: Vec<FieldId>,
    pub lost_fields: Vec<FieldId>,
    pub validated: bool,
    pub bit_reproducible: bool,
    pub validated_means: String,
    pub max_normalized_diff: f64,
    /// Bit-reproducible fields are left out of `Common fields differences`.
    pub hide_bit_repro_fields: bool,
}

impl FileComparison {
    pub fn unable_to_compare(&self) -> impl Iterator<Item = (&FieldId, &str)> {
        self.fields.iter().filter_map(|(id, outcome)| match outcome {
            FieldOutcome::Failed(msg) => Some((id, msg.as_str())),
            FieldOutcome::Compared(_) => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.unable_to_compare().next().is_some()
    }

    pub fn to_document(&self) -> ReportDocument {
        let mut differences = ReportDocument::new();
        for (id, outcome) in &self.fields {
            if let FieldOutcome::Compared(c) = outcome {
                if self.hide_bit_repro_fields && c.is_bit_reproducible() {
                    continue;
                }
                differences.set(id.to_string(), c.to_document());
            }
        }
        let unable: ReportDocument = self
            .unable_to_compare()
            .map(|(id, msg)| {
                (
                    id.to_string(),
                    ReportDocument::new().with("Error during comparison", msg),
                )
            })
            .collect();

        ReportDocument::new()
            .with(keys::VALIDATED, self.validated)
            .with(keys::VALIDATED_MEANS, self.validated_means.as_str())
            .with(keys::BIT_REPRODUCIBLE, self.bit_reproducible)
            .with("Common fields differences", differences)
            .with(MAX_NORMALIZED_DIFF, format_percent(self.max_normalized_diff))
            .with(keys::MAIN_METRICS, MAX_NORMALIZED_DIFF)
            .with("New fields", ids_to_value(&self.new_fields))
            .with("Lost fields", ids_to_value(&self.lost_fields))
            .with("Unable to compare fields", unable)
    }
}

pub const MAX_NORMALIZED_DIFF: &str = "Max normalized diff";

fn ids_to_value(ids: &[FieldId]) -> ReportValue {
    ReportValue::List(ids.iter().map(|id| ReportValue::from(id.to_string())).collect())
}

/// Render a ratio as a percentage with six decimals, e.g. `0.012000%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.6}%", ratio * 100.0)
}
