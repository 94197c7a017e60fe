//! Static registry of comparator kinds.

use tracing::warn;
use verdict_core::config::ComparatorSpec;
use verdict_core::errors::ComparatorError;

use super::context::ComparatorContext;
use super::fields::FieldSetComparator;
use super::norms::NormsComparator;
use super::types::Comparator;

/// Builds a comparator from its spec.
pub type ComparatorConstructor =
    fn(&ComparatorSpec, &ComparatorContext) -> Result<Box<dyn Comparator>, ComparatorError>;

/// Maps comparator kinds to their constructors.
#[derive(Clone)]
pub struct ComparatorRegistry {
    constructors: Vec<(String, ComparatorConstructor)>,
}

impl ComparatorRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: Vec::new(),
        }
    }

    /// Registry with the built-in `norms` and `fields_in_file` kinds.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(NormsComparator::KIND, NormsComparator::from_spec);
        registry.register(FieldSetComparator::KIND, FieldSetComparator::from_spec);
        registry
    }

    /// Register `constructor` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, constructor: ComparatorConstructor) {
        let kind = kind.into();
        match self.constructors.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = constructor,
            None => self.constructors.push((kind, constructor)),
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.iter().any(|(k, _)| k == kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.iter().map(|(k, _)| k.as_str())
    }

    /// Build one comparator. An unknown kind is an error when the entry is
    /// fatal, else `None`.
    pub fn build(
        &self,
        spec: &ComparatorSpec,
        ctx: &ComparatorContext,
    ) -> Result<Option<Box<dyn Comparator>>, ComparatorError> {
        match self.constructors.iter().find(|(k, _)| *k == spec.kind) {
            Some((_, constructor)) => constructor(spec, ctx).map(Some),
            None if spec.effective_fatal_exceptions() => Err(ComparatorError::UnknownKind {
                kind: spec.kind.clone(),
            }),
            None => {
                warn!(kind = %spec.kind, "No comparator registered for kind, skipping");
                Ok(None)
            }
        }
    }

    /// Build the panel, in configuration order.
    pub fn build_panel(
        &self,
        specs: &[ComparatorSpec],
        ctx: &ComparatorContext,
    ) -> Result<Vec<Box<dyn Comparator>>, ComparatorError> {
        let mut panel = Vec::with_capacity(specs.len());
        for spec in specs {
            if let Some(comparator) = self.build(spec, ctx)? {
                panel.push(comparator);
            }
        }
        Ok(panel)
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
