//! Pairing of test files with reference files.

use std::path::{Path, PathBuf};

use tracing::warn;
use verdict_core::constants::REFERENCE_PREFIXES;
use verdict_core::errors::ComparatorError;

use super::source::FieldSourceOpener;
use crate::references::ReferenceResource;

/// A test file and the reference file it is compared to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Test file name, the key of its results.
    pub test: String,
    pub test_path: PathBuf,
    pub reference_path: PathBuf,
}

/// File pairs, and the messages of the pairs that could not be made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<FilePair>,
    pub skipped: Vec<String>,
}

impl Pairing {
    fn skip_or_fail(&mut self, err: ComparatorError, fatal: bool) -> Result<(), ComparatorError> {
        if fatal {
            return Err(err);
        }
        warn!(error = %err, "Skipping file pair");
        self.skipped.push(err.to_string());
        Ok(())
    }
}

/// Build file pairs, either from explicit test `filenames` (the reference
/// carries one of the reference prefixes) or, when none is given, from
/// the `references` themselves (the test file is the reference file name
/// without its prefixes).
///
/// Missing files are an error when `fatal`, else they are logged and
/// recorded in [`Pairing::skipped`].
pub fn make_pairs(
    filenames: &[String],
    references: &[&ReferenceResource],
    work_dir: &Path,
    opener: &dyn FieldSourceOpener,
    fatal: bool,
) -> Result<Pairing, ComparatorError> {
    let reference_paths: Vec<PathBuf> = references.iter().map(|r| r.resolve(work_dir)).collect();
    if filenames.is_empty() {
        pairs_from_references(&reference_paths, work_dir, opener, fatal)
    } else {
        pairs_from_filenames(filenames, &reference_paths, work_dir, opener, fatal)
    }
}

fn pairs_from_references(
    reference_paths: &[PathBuf],
    work_dir: &Path,
    opener: &dyn FieldSourceOpener,
    fatal: bool,
) -> Result<Pairing, ComparatorError> {
    let mut pairing = Pairing::default();
    for reference_path in reference_paths {
        let reference = reference_path.display().to_string();
        if !opener.exists(reference_path) {
            pairing.skip_or_fail(ComparatorError::ReferenceNotFound { reference }, fatal)?;
            continue;
        }
        let Some(name) = reference_path.file_name().map(|n| n.to_string_lossy()) else {
            pairing.skip_or_fail(ComparatorError::ReferenceNotFound { reference }, fatal)?;
            continue;
        };
        let test = strip_reference_prefixes(&name).to_string();
        let test_path = work_dir.join(&test);
        if !opener.exists(&test_path) {
            pairing.skip_or_fail(
                ComparatorError::MissingCounterpart {
                    reference,
                    expected: test,
                },
                fatal,
            )?;
            continue;
        }
        pairing.pairs.push(FilePair {
            test,
            test_path,
            reference_path: reference_path.clone(),
        });
    }
    Ok(pairing)
}

fn pairs_from_filenames(
    filenames: &[String],
    reference_paths: &[PathBuf],
    work_dir: &Path,
    opener: &dyn FieldSourceOpener,
    fatal: bool,
) -> Result<Pairing, ComparatorError> {
    let mut pairing = Pairing::default();
    for name in filenames {
        let test_path = work_dir.join(name);
        if !opener.exists(&test_path) {
            pairing.skip_or_fail(
                ComparatorError::OutputNotFound {
                    path: test_path.display().to_string(),
                },
                fatal,
            )?;
            continue;
        }
        let reference_path = REFERENCE_PREFIXES.iter().find_map(|prefix| {
            let expected = format!("{prefix}{name}");
            reference_paths
                .iter()
                .find(|p| p.file_name().is_some_and(|n| n.to_string_lossy() == expected))
        });
        match reference_path {
            Some(reference_path) => pairing.pairs.push(FilePair {
                test: name.clone(),
                test_path,
                reference_path: reference_path.clone(),
            }),
            None => pairing.skip_or_fail(
                ComparatorError::MissingReference {
                    output: name.clone(),
                },
                fatal,
            )?,
        }
    }
    Ok(pairing)
}

/// Remove the known reference prefixes, in order, from a file name.
pub fn strip_reference_prefixes(name: &str) -> &str {
    REFERENCE_PREFIXES
        .iter()
        .fold(name, |n, prefix| n.strip_prefix(prefix).unwrap_or(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefixes() {
        assert_eq!(strip_reference_prefixes("ref.ICMSHFCST+0006"), "ICMSHFCST+0006");
        assert_eq!(strip_reference_prefixes("continuity.PF+0000"), "PF+0000");
        assert_eq!(strip_reference_prefixes("PGD.fa"), "PGD.fa");
    }
}
