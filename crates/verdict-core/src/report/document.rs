//! Ordered report document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::ReportValue;
use crate::errors::ReportError;

/// Ordered key → value document. Insertion order is preserved through
/// serialization, and an existing key is only replaced through [`set`].
///
/// [`set`]: ReportDocument::set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    entries: Vec<(String, ReportValue)>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ReportValue> {
        match self.position(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ReportValue::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ReportValue::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ReportValue::as_f64)
    }

    pub fn get_document(&self, key: &str) -> Option<&ReportDocument> {
        self.get(key).and_then(ReportValue::as_document)
    }

    /// Follow a path of keys through nested documents.
    pub fn get_in(&self, path: &[&str]) -> Option<&ReportValue> {
        let (last, parents) = path.split_last()?;
        let mut doc = self;
        for key in parents {
            doc = doc.get_document(key)?;
        }
        doc.get(last)
    }

    /// Insert a new key. Fails if the key is already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ReportValue>,
    ) -> Result<(), ReportError> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(ReportError::DuplicateKey { key });
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Insert or overwrite a key, returning the previous value.
    /// An overwritten key keeps its original position.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ReportValue>,
    ) -> Option<ReportValue> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder form of [`set`](ReportDocument::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ReportValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ReportValue> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Nested merge: documents present on both sides are merged recursively,
    /// any other value from `other` replaces the current one.
    pub fn merge(&mut self, other: ReportDocument) {
        for (key, value) in other.entries {
            if let ReportValue::Document(incoming) = value {
                if let Some(ReportValue::Document(existing)) = self.get_mut(&key) {
                    existing.merge(incoming);
                    continue;
                }
                self.set(key, ReportValue::Document(incoming));
            } else {
                self.set(key, value);
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(|e| ReportError::Serialize(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Write the document as pretty JSON. The content goes to a temporary
    /// sibling file first and is renamed over `path`.
    pub fn dump(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_string()?;
        let tmp = temporary_sibling(path);
        fs::write(&tmp, json).map_err(|e| ReportError::Write {
            path: tmp.display().to_string(),
            message: e.to_string(),
        })?;
        fs::rename(&tmp, path).map_err(|e| ReportError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|e| ReportError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ReportError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

impl<K: Into<String>, V: Into<ReportValue>> FromIterator<(K, V)> for ReportDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (k, v) in iter {
            doc.set(k, v);
        }
        doc
    }
}

impl IntoIterator for ReportDocument {
    type Item = (String, ReportValue);
    type IntoIter = std::vec::IntoIter<(String, ReportValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ReportDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReportDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ReportValue::deserialize(deserializer)? {
            ReportValue::Document(doc) => Ok(doc),
            other => Err(de::Error::custom(format!(
                "expected a document, found {}",
                other.type_name()
            ))),
        }
    }
}
