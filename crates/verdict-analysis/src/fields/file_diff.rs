//! Comparison of all the fields of a test source with a reference source.

use std::collections::HashSet;

use tracing::{debug, warn};
use verdict_core::errors::DiffError;

use super::field_diff::{compare_fields, FieldsDiffOptions};
use super::source::FieldSource;
use super::types::{FieldComparison, FieldId, FieldOutcome, FileComparison};

const BIT_REPRO_MEANS: &str = "All fields have identical shape/mask than reference, and data is bit-repro";
const NORMALIZED_MEANS: &str =
    "All fields have identical shape/mask than reference, and normalized errors lower than";
const NO_ORPHAN_MEANS: &str = ", and no field is orphan on one or the other side.";

/// Compare every common field of `test` and `reference`.
///
/// Fields are partitioned into new (test only), lost (reference only) and
/// common ones. A field error is recorded on the field, unless
/// `fatal_exceptions` is set, in which case it aborts the comparison.
pub fn compare_sources(
    test: &dyn FieldSource,
    reference: &dyn FieldSource,
    options: &FieldsDiffOptions,
) -> Result<FileComparison, DiffError> {
    let test_ids: Vec<FieldId> = test
        .list_field_identities()
        .filter(|id| !id.is_skipped())
        .collect();
    let ref_ids: Vec<FieldId> = reference
        .list_field_identities()
        .filter(|id| !id.is_skipped())
        .collect();

    let test_set: HashSet<&FieldId> = test_ids.iter().collect();
    let ref_set: HashSet<&FieldId> = ref_ids.iter().collect();

    let new_fields: Vec<FieldId> = test_ids
        .iter()
        .filter(|id| !ref_set.contains(id))
        .cloned()
        .collect();
    let lost_fields: Vec<FieldId> = ref_ids
        .iter()
        .filter(|id| !test_set.contains(id))
        .cloned()
        .collect();
    let mut common: Vec<FieldId> = test_ids
        .iter()
        .filter(|id| ref_set.contains(id))
        .cloned()
        .collect();
    if common.iter().all(|id| id.as_name().is_some()) {
        common.sort();
    }

    let mut fields = Vec::with_capacity(common.len());
    for id in common {
        debug!(field = %id, "Comparing field");
        let outcome = match compare_one(test, reference, &id, options) {
            Ok(c) => FieldOutcome::Compared(c),
            Err(e) if options.fatal_exceptions => return Err(e),
            Err(e) => {
                warn!(field = %id, error = %e, "Field comparison failed");
                FieldOutcome::Failed(e.to_string())
            }
        };
        fields.push((id, outcome));
    }

    let mut validated = fields.iter().all(|(_, o)| o.validated());
    let bit_reproducible = fields.iter().all(|(_, o)| o.bit_reproducible());
    let max_normalized_diff = fields
        .iter()
        .map(|(_, o)| o.max_normalized_error())
        .fold(0.0_f64, f64::max);

    let mut validated_means = if options.validate_if_bit_repro_only {
        BIT_REPRO_MEANS.to_string()
    } else {
        format!("{NORMALIZED_MEANS} {}", options.normalized_validation_threshold)
    };
    if !options.ignore_orphan_fields {
        if !new_fields.is_empty() || !lost_fields.is_empty() {
            validated = false;
        }
        validated_means.push_str(NO_ORPHAN_MEANS);
    }

    Ok(FileComparison {
        fields,
        new_fields,
        lost_fields,
        validated,
        bit_reproducible,
        validated_means,
        max_normalized_diff,
        hide_bit_repro_fields: options.hide_bit_repro_fields,
    })
}

fn compare_one(
    test: &dyn FieldSource,
    reference: &dyn FieldSource,
    id: &FieldId,
    options: &FieldsDiffOptions,
) -> Result<FieldComparison, DiffError> {
    let mut t = test.read_field(id)?;
    if t.spectral {
        t = test.to_gridpoint(id, t)?;
    }
    let mut r = reference.read_field(id)?;
    if r.spectral {
        r = reference.to_gridpoint(id, r)?;
    }
    Ok(compare_fields(&t, &r, options))
}
