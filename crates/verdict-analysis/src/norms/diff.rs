//! Comparison of two sequences of norms snapshots.

use std::collections::BTreeSet;

use verdict_core::constants::{NORMSDIGITS_BITREPRO, NORMS_SIGNIFICANT_DIGITS};
use verdict_core::report::{keys, ReportDocument, ReportValue};

use super::digits::differing_digits;
use super::types::NormsSnapshot;

pub const MAXIMUM_DIFFERENT_DIGITS: &str = "Maximum different digits";
pub const NORMS_COMPARED: &str = "_Norms Compared (all)";

/// Outcome of a norms comparison.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormsComparison {
    /// Worst differing digit count over all compared values.
    pub worst_digits: u32,
    pub compared_values: usize,
    /// Text diff, one line per step, group or value that differs.
    pub lines: Vec<String>,
}

impl NormsComparison {
    fn record(&mut self, digits: u32, line: String) {
        self.worst_digits = self.worst_digits.max(digits);
        if digits > 0 {
            self.lines.push(line);
        }
    }

    pub fn validated(&self, digits4validation: u32) -> bool {
        self.worst_digits <= digits4validation
    }

    pub fn bit_reproducible(&self) -> bool {
        self.worst_digits <= NORMSDIGITS_BITREPRO
    }

    pub fn to_document(&self, digits4validation: u32) -> ReportDocument {
        let validated = self.validated(digits4validation);
        let mut doc = ReportDocument::new()
            .with(MAXIMUM_DIFFERENT_DIGITS, self.worst_digits)
            .with(
                keys::VALIDATED_MEANS,
                format!("Maximum number of different digits in norms <= {digits4validation}"),
            )
            .with(keys::VALIDATED, validated)
            .with(keys::BIT_REPRODUCIBLE, self.bit_reproducible())
            .with(keys::MAIN_METRICS, MAXIMUM_DIFFERENT_DIGITS);
        if !validated {
            doc.set(
                NORMS_COMPARED,
                ReportValue::List(self.lines.iter().map(|l| ReportValue::from(l.as_str())).collect()),
            );
        }
        doc
    }
}

/// Compare `test` snapshots with `reference` snapshots, paired by step.
/// Steps, groups or norms present on one side only count as a full
/// disagreement.
pub fn compare_snapshots(test: &[NormsSnapshot], reference: &[NormsSnapshot]) -> NormsComparison {
    let mut cmp = NormsComparison::default();
    let mut matched = vec![false; reference.len()];

    for t in test {
        let found = reference
            .iter()
            .enumerate()
            .find(|(i, r)| !matched[*i] && r.step == t.step);
        match found {
            Some((i, r)) => {
                matched[i] = true;
                compare_step(t, r, &mut cmp);
            }
            None => cmp.record(
                NORMS_SIGNIFICANT_DIGITS,
                format!("step {}: missing in reference", t.step),
            ),
        }
    }
    for (r, _) in reference.iter().zip(&matched).filter(|(_, m)| !**m) {
        cmp.record(
            NORMS_SIGNIFICANT_DIGITS,
            format!("step {}: missing in test", r.step),
        );
    }
    cmp
}

fn compare_step(test: &NormsSnapshot, reference: &NormsSnapshot, cmp: &mut NormsComparison) {
    let groups: BTreeSet<&String> = test.groups.keys().chain(reference.groups.keys()).collect();
    for group in groups {
        let (Some(t), Some(r)) = (test.groups.get(group), reference.groups.get(group)) else {
            let side = if test.groups.contains_key(group) { "reference" } else { "test" };
            cmp.record(
                NORMS_SIGNIFICANT_DIGITS,
                format!("step {} {group}: missing in {side}", test.step),
            );
            continue;
        };
        let names: BTreeSet<&String> = t.keys().chain(r.keys()).collect();
        for name in names {
            match (t.get(name), r.get(name)) {
                (Some(&tv), Some(&rv)) => {
                    let digits = differing_digits(tv, rv);
                    cmp.compared_values += 1;
                    cmp.record(
                        digits,
                        format!(
                            "step {} {group} {name}: test={tv:e} ref={rv:e} digits={digits}",
                            test.step
                        ),
                    );
                }
                (Some(_), None) => cmp.record(
                    NORMS_SIGNIFICANT_DIGITS,
                    format!("step {} {group} {name}: missing in reference", test.step),
                ),
                _ => cmp.record(
                    NORMS_SIGNIFICANT_DIGITS,
                    format!("step {} {group} {name}: missing in test", test.step),
                ),
            }
        }
    }
}
