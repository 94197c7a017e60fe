//! Reference resource descriptors, as handed to comparators.

use std::path::{Path, PathBuf};

/// A resource of a reference run, already fetched to a local container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceResource {
    /// Location(s) of the resource; several locations are `;`-separated.
    pub uri: String,
    /// Kind of resource (`historic`, `plisting`, `taskinfo`, ...).
    pub resource_kind: String,
    /// Local path the resource was fetched to, relative to the work dir
    /// unless absolute.
    pub container_path: PathBuf,
    /// Task that produced the resource.
    pub producer_task: Option<String>,
}

impl ReferenceResource {
    pub fn new(resource_kind: impl Into<String>, container_path: impl Into<PathBuf>) -> Self {
        let container_path = container_path.into();
        Self {
            uri: container_path.display().to_string(),
            resource_kind: resource_kind.into(),
            container_path,
            producer_task: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_producer_task(mut self, task: impl Into<String>) -> Self {
        self.producer_task = Some(task.into());
        self
    }

    pub fn locate(&self) -> &str {
        &self.uri
    }

    pub fn locations(&self) -> Vec<String> {
        self.uri
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_kind_of(&self, kinds: &[&str]) -> bool {
        kinds.contains(&self.resource_kind.as_str())
    }

    /// Local path of the container, resolved against `work_dir`.
    pub fn resolve(&self, work_dir: &Path) -> PathBuf {
        resolve_path(work_dir, &self.container_path)
    }
}

/// References whose kind is one of `kinds`, in their original order.
pub fn of_kinds<'a>(
    references: &'a [ReferenceResource],
    kinds: &'a [&'a str],
) -> impl Iterator<Item = &'a ReferenceResource> + 'a {
    references.iter().filter(move |r| r.is_kind_of(kinds))
}

pub(crate) fn resolve_path(work_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}
