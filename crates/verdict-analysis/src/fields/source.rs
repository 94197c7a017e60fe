//! Field sources: the seam between the diff engines and file formats.

use std::path::{Path, PathBuf};

use verdict_core::errors::DiffError;

use super::types::{FieldId, FieldValue};

/// A readable set of fields, usually one output file.
pub trait FieldSource: Send {
    /// Name of the source, for logs.
    fn name(&self) -> &str;

    /// Identities of the fields held by the source, in storage order.
    /// Every call starts a fresh iteration.
    fn list_field_identities(&self) -> Box<dyn Iterator<Item = FieldId> + '_>;

    fn read_field(&self, id: &FieldId) -> Result<FieldValue, DiffError>;

    /// Transform a spectral field to grid-point space.
    fn to_gridpoint(&self, id: &FieldId, _field: FieldValue) -> Result<FieldValue, DiffError> {
        Err(DiffError::SpectralTransform {
            field: id.to_string(),
            message: format!("source '{}' has no spectral transform", self.name()),
        })
    }
}

/// Opens field sources by path. Shared across threads in parallel mode.
pub trait FieldSourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn FieldSource>, DiffError>;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// File names in `dir` matching any of `patterns`, sorted, without duplicates.
    fn discover(&self, dir: &Path, patterns: &[String]) -> Vec<String> {
        let mut names = Vec::new();
        for pattern in patterns {
            let full = dir.join(pattern);
            let Ok(paths) = glob::glob(&full.to_string_lossy()) else {
                tracing::warn!(pattern = %pattern, "Invalid discovery pattern");
                continue;
            };
            names.extend(paths.filter_map(Result::ok).filter_map(file_name));
        }
        names.sort();
        names.dedup();
        names
    }
}

fn file_name(path: PathBuf) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
