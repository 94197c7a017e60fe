//! Tests for the field and file diff engines.

use verdict_analysis::fields::{
    compare_fields, compare_sources, DataDiff, FieldData, FieldId, FieldOutcome, FieldValue,
    FieldsDiffOptions, MemoryFieldSource,
};
use verdict_core::report::{keys, ReportDocument};

fn gp(values: Vec<f64>) -> FieldValue {
    let n = values.len();
    FieldValue::new(FieldData::float(vec![n], values))
        .with_validity(ReportDocument::new().with("term", 6))
        .with_geometry(ReportDocument::new().with("name", "GLOB25"))
}

fn lenient() -> FieldsDiffOptions {
    FieldsDiffOptions {
        validate_if_bit_repro_only: false,
        ..Default::default()
    }
}

#[test]
fn test_identical_fields_are_bit_reproducible() {
    let f = gp(vec![1.0, 2.0, 3.0]);
    let cmp = compare_fields(&f, &f, &FieldsDiffOptions::default());
    assert!(cmp.validated);
    assert!(cmp.data_bit_repro);
    assert!(cmp.is_bit_reproducible());
    assert_eq!(cmp.data_diff, DataDiff::NotComputed);

    let doc = cmp.to_document();
    assert!(!doc.contains_key("Normalized data diff"));
    assert_eq!(doc.get_bool("Data bit-repro"), Some(true));
}

#[test]
fn test_difference_below_epsilon_is_bit_reproducible() {
    let t = gp(vec![1.0, 2.0 + 1e-13]);
    let r = gp(vec![1.0, 2.0]);
    assert!(compare_fields(&t, &r, &FieldsDiffOptions::default()).data_bit_repro);
}

#[test]
fn test_integer_data_requires_exact_equality() {
    let t = FieldValue::new(FieldData::integer(vec![3], vec![1, 2, 3]));
    let r = FieldValue::new(FieldData::integer(vec![3], vec![1, 2, 4]));
    let cmp = compare_fields(&t, &r, &FieldsDiffOptions::default());
    assert!(!cmp.data_bit_repro);
    assert!(!cmp.validated);
    assert!(!cmp.metadata_compared);
}

#[test]
fn test_constant_offset_bias_and_std() {
    let reference: Vec<f64> = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let k = 0.002;
    let test: Vec<f64> = reference.iter().map(|x| x + k).collect();
    let cmp = compare_fields(&gp(test), &gp(reference), &lenient());

    let DataDiff::Computed(diff) = cmp.data_diff else {
        panic!("normalized diff expected");
    };
    let expected = k / 4.0;
    assert!((diff.bias - expected).abs() < 1e-12, "bias {}", diff.bias);
    assert!(diff.std.abs() < 1e-12, "std {}", diff.std);
    assert!((diff.errmax - expected).abs() < 1e-12);
    assert_eq!(cmp.mask_is_common, Some(true));
    // errmax = 5e-4 < 1e-3
    assert!(cmp.validated);
}

#[test]
fn test_bit_repro_only_rejects_small_differences() {
    let cmp = compare_fields(
        &gp(vec![0.0, 1.0 + 1e-6]),
        &gp(vec![0.0, 1.0]),
        &FieldsDiffOptions::default(),
    );
    assert!(!cmp.validated);
    assert!(!cmp.data_bit_repro);
}

#[test]
fn test_threshold_is_exclusive() {
    let options = FieldsDiffOptions {
        normalized_validation_threshold: 0.5,
        ..lenient()
    };
    let cmp = compare_fields(&gp(vec![0.0, 1.5]), &gp(vec![0.0, 1.0]), &options);
    assert!((cmp.max_normalized_error() - 0.5).abs() < 1e-12);
    assert!(!cmp.validated);
}

#[test]
fn test_shape_mismatch() {
    let cmp = compare_fields(&gp(vec![1.0, 2.0]), &gp(vec![1.0, 2.0, 3.0]), &lenient());
    assert!(!cmp.validated);
    assert!(!cmp.data_bit_repro);
    assert_eq!(cmp.data_diff, DataDiff::DimensionsDiffer);
    assert_eq!(
        cmp.to_document().get_str("Normalized data diff"),
        Some("Comparison not possible: dimensions differ")
    );
}

#[test]
fn test_mask_difference_prevents_validation() {
    let t = FieldValue::new(FieldData::float(vec![3], vec![1.0, 2.0, 3.0]).with_mask(vec![false, true, false]));
    let r = FieldValue::new(FieldData::float(vec![3], vec![1.0, 2.0, 3.0]));
    let cmp = compare_fields(&t, &r, &lenient());
    assert!(!cmp.data_bit_repro);
    assert_eq!(cmp.mask_is_common, Some(false));
    assert!(!cmp.validated);
}

#[test]
fn test_metadata_diff_prevents_validation() {
    let t = gp(vec![1.0, 2.0]).with_validity(ReportDocument::new().with("term", 12));
    let r = gp(vec![1.0, 2.0]);
    let cmp = compare_fields(&t, &r, &FieldsDiffOptions::default());
    assert!(cmp.data_bit_repro);
    assert!(!cmp.is_bit_reproducible());
    assert!(!cmp.validated);

    let diff = cmp.validity_diff.as_ref().unwrap();
    let term = diff.get_document("term").unwrap();
    assert_eq!(term.get_f64("test"), Some(12.0));
    assert_eq!(term.get_f64("ref"), Some(6.0));

    let ignored = compare_fields(
        &t,
        &r,
        &FieldsDiffOptions {
            ignore_meta: true,
            ..Default::default()
        },
    );
    assert!(ignored.validated);
    assert!(!ignored.to_document().contains_key("Validity diff"));
}

#[test]
fn test_spectral_fields_are_compared_in_gridpoint_space() {
    let spectral = FieldValue::new(FieldData::float(vec![2], vec![9.0, 9.0])).spectral();
    let test = MemoryFieldSource::new("test")
        .with_field("SPECSURFGEOPOTEN", spectral.clone())
        .with_gridpoint("SPECSURFGEOPOTEN", FieldData::float(vec![3], vec![1.0, 2.0, 3.0]));
    let reference = MemoryFieldSource::new("ref")
        .with_field("SPECSURFGEOPOTEN", spectral)
        .with_gridpoint("SPECSURFGEOPOTEN", FieldData::float(vec![3], vec![1.0, 2.0, 3.0]));

    let file = compare_sources(&test, &reference, &FieldsDiffOptions::default()).unwrap();
    assert!(file.validated);
    assert!(file.bit_reproducible);
}

fn source(name: &str, fields: &[(&str, Vec<f64>)]) -> MemoryFieldSource {
    fields
        .iter()
        .fold(MemoryFieldSource::new(name), |s, (id, values)| s.with_field(*id, gp(values.clone())))
}

#[test]
fn test_orphans_invalidate_unless_ignored() {
    let test = source("test", &[("A", vec![1.0]), ("B", vec![2.0])]);
    let reference = source("ref", &[("A", vec![1.0]), ("C", vec![3.0])]);

    let file = compare_sources(&test, &reference, &FieldsDiffOptions::default()).unwrap();
    assert!(!file.validated);
    assert!(file.bit_reproducible);
    assert_eq!(file.new_fields, vec![FieldId::name("B")]);
    assert_eq!(file.lost_fields, vec![FieldId::name("C")]);
    assert!(file
        .validated_means
        .ends_with(", and no field is orphan on one or the other side."));

    let options = FieldsDiffOptions {
        ignore_orphan_fields: true,
        ..Default::default()
    };
    let file = compare_sources(&test, &reference, &options).unwrap();
    assert!(file.validated);
    assert!(!file.validated_means.contains("orphan"));
}

#[test]
fn test_threshold_mode_means_names_the_threshold() {
    let test = source("test", &[("A", vec![1.0, 2.0])]);
    let reference = source("ref", &[("A", vec![1.0, 2.0])]);

    let file = compare_sources(&test, &reference, &lenient()).unwrap();
    assert_eq!(
        file.validated_means,
        "All fields have identical shape/mask than reference, and normalized errors lower than 0.001, \
         and no field is orphan on one or the other side."
    );
}

#[test]
fn test_skipped_fields_are_ignored_entirely() {
    let test = source("test", &[("A", vec![1.0]), ("SFX._FBUF_01", vec![5.0])]);
    let reference = source("ref", &[("A", vec![1.0])]);
    let file = compare_sources(&test, &reference, &FieldsDiffOptions::default()).unwrap();
    assert!(file.validated);
    assert!(file.new_fields.is_empty());
    assert_eq!(file.fields.len(), 1);
}

#[test]
fn test_common_fields_sorted_by_name() {
    let test = source("test", &[("Z", vec![1.0]), ("A", vec![1.0]), ("M", vec![1.0])]);
    let reference = source("ref", &[("M", vec![1.0]), ("Z", vec![1.0]), ("A", vec![1.0])]);
    let file = compare_sources(&test, &reference, &FieldsDiffOptions::default()).unwrap();
    let order: Vec<String> = file.fields.iter().map(|(id, _)| id.to_string()).collect();
    assert_eq!(order, vec!["A", "M", "Z"]);
}

#[test]
fn test_handles_keep_test_listing_order() {
    let h1 = FieldId::handle([("shortName", "t"), ("level", "850")]);
    let h2 = FieldId::handle([("shortName", "q"), ("level", "500")]);
    let f = gp(vec![1.0]);
    let test = MemoryFieldSource::new("test")
        .with_field(h1.clone(), f.clone())
        .with_field(h2.clone(), f.clone());
    let reference = MemoryFieldSource::new("ref")
        .with_field(h2.clone(), f.clone())
        .with_field(h1.clone(), f);
    let file = compare_sources(&test, &reference, &FieldsDiffOptions::default()).unwrap();
    let order: Vec<&FieldId> = file.fields.iter().map(|(id, _)| id).collect();
    assert_eq!(order, vec![&h1, &h2]);
    assert_eq!(h1.to_string(), "{level: 850, shortName: t}");
}

#[test]
fn test_field_errors_recorded_when_not_fatal() {
    let broken = FieldValue::new(FieldData::float(vec![1], vec![0.0])).spectral();
    let test = source("test", &[("A", vec![1.0])]).with_field("SPEC", broken.clone());
    let reference = source("ref", &[("A", vec![1.0])]).with_field("SPEC", broken);

    let fatal = compare_sources(&test, &reference, &FieldsDiffOptions::default());
    assert!(fatal.is_err());

    let options = FieldsDiffOptions {
        fatal_exceptions: false,
        ..Default::default()
    };
    let file = compare_sources(&test, &reference, &options).unwrap();
    assert!(file.has_failures());
    assert!(!file.validated);
    assert!(matches!(file.fields[1].1, FieldOutcome::Failed(_)));

    let doc = file.to_document();
    let unable = doc.get_document("Unable to compare fields").unwrap();
    assert!(unable
        .get_document("SPEC")
        .and_then(|d| d.get_str("Error during comparison"))
        .is_some());
}

#[test]
fn test_max_normalized_diff_is_a_fold_over_fields() {
    let test = source("test", &[("A", vec![0.0, 1.1]), ("B", vec![0.0, 1.3]), ("C", vec![0.0, 1.0])]);
    let reference = source("ref", &[("A", vec![0.0, 1.0]), ("B", vec![0.0, 1.0]), ("C", vec![0.0, 1.0])]);
    let file = compare_sources(&test, &reference, &lenient()).unwrap();
    assert!((file.max_normalized_diff - 0.3).abs() < 1e-9);
    assert!(!file.bit_reproducible);

    let doc = file.to_document();
    assert_eq!(doc.get_str(keys::MAIN_METRICS), Some("Max normalized diff"));
    assert_eq!(doc.get_str("Max normalized diff"), Some("30.000000%"));
    // C is bit-repro and hidden
    let differences = doc.get_document("Common fields differences").unwrap();
    assert_eq!(differences.keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn test_nan_against_finite_value_never_validates() {
    let t = FieldValue::new(FieldData::float(vec![3], vec![0.0, f64::NAN, 2.0]));
    let r = FieldValue::new(FieldData::float(vec![3], vec![0.0, 1.0, 2.0]));
    let cmp = compare_fields(&t, &r, &lenient());

    assert!(!cmp.data_bit_repro);
    assert!(!cmp.validated);
    assert_eq!(cmp.max_normalized_error(), f64::INFINITY);

    let test = MemoryFieldSource::new("test").with_field("T", t);
    let reference = MemoryFieldSource::new("ref").with_field("T", r);
    let file = compare_sources(&test, &reference, &lenient()).unwrap();
    assert!(!file.validated);
    assert_eq!(file.max_normalized_diff, f64::INFINITY);
}

#[test]
fn test_nan_on_both_sides_counts_as_equal() {
    let t = FieldValue::new(FieldData::float(vec![3], vec![0.0, f64::NAN, 2.5]));
    let r = FieldValue::new(FieldData::float(vec![3], vec![0.0, f64::NAN, 2.0]));
    let cmp = compare_fields(&t, &r, &lenient());

    let DataDiff::Computed(diff) = cmp.data_diff else {
        panic!("normalized diff expected");
    };
    assert!(diff.errmax.is_finite());
    assert!((diff.errmax - 0.25).abs() < 1e-12);
}
