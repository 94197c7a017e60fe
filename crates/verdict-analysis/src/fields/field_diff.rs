//! Pairwise comparison of a test field with its reference.

use statrs::statistics::Statistics;
use verdict_core::constants::{EPSILON, NORMALIZED_FIELDS_DIFF};

use super::types::{DataDiff, FieldComparison, FieldData, FieldValue, FieldValues, NormalizedDiff};

/// Options driving field and file comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldsDiffOptions {
    /// Skip the validity/geometry comparison.
    pub ignore_meta: bool,
    /// Fields present on one side only do not invalidate the file.
    pub ignore_orphan_fields: bool,
    /// Leave bit-reproducible fields out of the per-field report.
    pub hide_bit_repro_fields: bool,
    /// Validate only bit-reproducible data.
    pub validate_if_bit_repro_only: bool,
    /// Maximum normalized error for validation when not bit-repro only.
    pub normalized_validation_threshold: f64,
    /// Field errors abort the file comparison.
    pub fatal_exceptions: bool,
}

impl Default for FieldsDiffOptions {
    fn default() -> Self {
        Self {
            ignore_meta: false,
            ignore_orphan_fields: false,
            hide_bit_repro_fields: true,
            validate_if_bit_repro_only: true,
            normalized_validation_threshold: NORMALIZED_FIELDS_DIFF,
            fatal_exceptions: true,
        }
    }
}

/// Compare two fields already in grid-point space.
pub fn compare_fields(
    test: &FieldValue,
    reference: &FieldValue,
    options: &FieldsDiffOptions,
) -> FieldComparison {
    let mut comparison = FieldComparison {
        validated: true,
        data_bit_repro: false,
        metadata_compared: false,
        validity_diff: None,
        geometry_diff: None,
        data_diff: DataDiff::NotComputed,
        mask_is_common: None,
    };

    if !options.ignore_meta {
        if let (Some(t), Some(r)) = (&test.validity, &reference.validity) {
            comparison.validity_diff = t.recursive_diff(r);
            comparison.metadata_compared = true;
        }
        if let (Some(t), Some(r)) = (&test.geometry, &reference.geometry) {
            comparison.geometry_diff = t.recursive_diff(r);
            comparison.metadata_compared = true;
        }
        if comparison.validity_diff.is_some() || comparison.geometry_diff.is_some() {
            comparison.validated = false;
        }
    }

    if test.data.shape != reference.data.shape || test.data.len() != reference.data.len() {
        comparison.validated = false;
        comparison.data_diff = DataDiff::DimensionsDiffer;
        return comparison;
    }

    comparison.data_bit_repro = data_bit_reproducible(&test.data, &reference.data);
    if !comparison.data_bit_repro {
        let (diff, mask_is_common) = normalized_diff(&test.data, &reference.data);
        if !mask_is_common
            || options.validate_if_bit_repro_only
            || !diff.errmax.is_finite()
            || diff.errmax >= options.normalized_validation_threshold
        {
            comparison.validated = false;
        }
        comparison.data_diff = DataDiff::Computed(diff);
        comparison.mask_is_common = Some(mask_is_common);
    }
    comparison
}

/// Identical masks and identical defined values: exact for integer data,
/// within [`EPSILON`] as soon as one side is floating point.
pub fn data_bit_reproducible(test: &FieldData, reference: &FieldData) -> bool {
    if test.len() != reference.len() || test.full_mask() != reference.full_mask() {
        return false;
    }
    match (&test.values, &reference.values) {
        (FieldValues::Integer(t), FieldValues::Integer(r)) => t
            .iter()
            .zip(r)
            .enumerate()
            .all(|(i, (t, r))| !test.is_defined(i) || t == r),
        _ => (0..test.len())
            .filter(|&i| test.is_defined(i))
            .all(|i| floats_match(test.value(i), reference.value(i))),
    }
}

fn floats_match(t: f64, r: f64) -> bool {
    t == r || (t - r).abs() <= EPSILON || (t.is_nan() && r.is_nan())
}

/// Normalized distance over the elements defined on both sides, with the
/// reference range as scale. A constant reference has no range: raw
/// differences are used instead.
///
/// A non-finite difference (NaN or infinite value on one side only) makes
/// `errmax` infinite. NaN on both sides counts as equal.
pub fn normalized_diff(test: &FieldData, reference: &FieldData) -> (NormalizedDiff, bool) {
    let mask_is_common = test.full_mask() == reference.full_mask();

    let (rmin, rmax) = reference
        .defined_values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    let range = rmax - rmin;
    let (offset, scale) = if range.is_finite() && range > 0.0 {
        (rmin, range)
    } else {
        (0.0, 1.0)
    };

    let diffs: Vec<f64> = (0..test.len())
        .filter(|&i| test.is_defined(i) && reference.is_defined(i))
        .map(|i| normalized_difference(test.value(i), reference.value(i), offset, scale))
        .collect();
    if diffs.is_empty() {
        return (NormalizedDiff::default(), mask_is_common);
    }

    let errmax = diffs.iter().fold(0.0_f64, |acc, d| {
        if d.is_finite() {
            acc.max(d.abs())
        } else {
            f64::INFINITY
        }
    });
    let diff = NormalizedDiff {
        bias: diffs.iter().mean(),
        std: diffs.iter().population_std_dev(),
        errmax,
    };
    (diff, mask_is_common)
}

fn normalized_difference(t: f64, r: f64, offset: f64, scale: f64) -> f64 {
    if t.is_nan() && r.is_nan() {
        return 0.0;
    }
    (t - offset) / scale - (r - offset) / scale
}
