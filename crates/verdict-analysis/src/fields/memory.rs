//! In-memory field sources, for embedding callers and tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use verdict_core::errors::DiffError;

use super::source::{FieldSource, FieldSourceOpener};
use super::types::{FieldData, FieldId, FieldValue};

/// Fields held in memory, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldSource {
    name: String,
    fields: Vec<(FieldId, FieldValue)>,
    gridpoint: HashMap<FieldId, FieldData>,
}

impl MemoryFieldSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, id: impl Into<FieldId>, value: FieldValue) -> Self {
        self.insert(id, value);
        self
    }

    /// Grid-point data returned when the spectral field `id` is transformed.
    pub fn with_gridpoint(mut self, id: impl Into<FieldId>, data: FieldData) -> Self {
        self.gridpoint.insert(id.into(), data);
        self
    }

    pub fn insert(&mut self, id: impl Into<FieldId>, value: FieldValue) {
        let id = id.into();
        match self.fields.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((id, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldSource for MemoryFieldSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_field_identities(&self) -> Box<dyn Iterator<Item = FieldId> + '_> {
        Box::new(self.fields.iter().map(|(id, _)| id.clone()))
    }

    fn read_field(&self, id: &FieldId) -> Result<FieldValue, DiffError> {
        self.fields
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| DiffError::ReadField {
                field: id.to_string(),
                message: format!("not found in '{}'", self.name),
            })
    }

    fn to_gridpoint(&self, id: &FieldId, field: FieldValue) -> Result<FieldValue, DiffError> {
        let data = self
            .gridpoint
            .get(id)
            .cloned()
            .ok_or_else(|| DiffError::SpectralTransform {
                field: id.to_string(),
                message: format!("no grid-point data in '{}'", self.name),
            })?;
        Ok(FieldValue {
            data,
            spectral: false,
            ..field
        })
    }
}

/// Opens [`MemoryFieldSource`]s registered by path. A path that is not
/// registered as such is looked up by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldOpener {
    sources: HashMap<PathBuf, MemoryFieldSource>,
}

impl MemoryFieldOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, source: MemoryFieldSource) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: MemoryFieldSource) {
        self.sources.insert(path.into(), source);
    }

    fn lookup(&self, path: &Path) -> Option<&MemoryFieldSource> {
        self.sources.get(path).or_else(|| {
            let name = path.file_name()?;
            self.sources
                .iter()
                .find(|(p, _)| p.file_name() == Some(name))
                .map(|(_, s)| s)
        })
    }
}

impl FieldSourceOpener for MemoryFieldOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FieldSource>, DiffError> {
        self.lookup(path)
            .cloned()
            .map(|s| Box::new(s) as Box<dyn FieldSource>)
            .ok_or_else(|| DiffError::Open {
                path: path.display().to_string(),
                message: "no such in-memory source".to_string(),
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    fn discover(&self, _dir: &Path, patterns: &[String]) -> Vec<String> {
        let patterns: Vec<glob::Pattern> = patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        let mut names: Vec<String> = self
            .sources
            .keys()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| patterns.iter().any(|p| p.matches(n)))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
