//! What comparators are built with, besides their own spec.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::fields::{FieldSourceOpener, MemoryFieldOpener};
use crate::norms::{ListingOpener, MemoryListingOpener};

/// Working directory and format openers handed to comparator constructors.
#[derive(Clone)]
pub struct ComparatorContext {
    pub work_dir: PathBuf,
    pub field_opener: Arc<dyn FieldSourceOpener>,
    pub listing_opener: Arc<dyn ListingOpener>,
}

impl ComparatorContext {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        field_opener: Arc<dyn FieldSourceOpener>,
        listing_opener: Arc<dyn ListingOpener>,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            field_opener,
            listing_opener,
        }
    }

    /// Context with empty in-memory openers.
    pub fn in_memory(work_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            work_dir,
            Arc::new(MemoryFieldOpener::new()),
            Arc::new(MemoryListingOpener::new()),
        )
    }
}

impl fmt::Debug for ComparatorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorContext")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}
