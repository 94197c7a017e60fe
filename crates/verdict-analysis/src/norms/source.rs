//! Listing sources: where norms are parsed from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use verdict_core::errors::DiffError;

use super::types::NormsSet;

pub trait ListingSource: Send {
    fn parse_norms(&self) -> Result<NormsSet, DiffError>;
}

pub trait ListingOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn ListingSource>, DiffError>;
}

impl ListingSource for NormsSet {
    fn parse_norms(&self) -> Result<NormsSet, DiffError> {
        Ok(self.clone())
    }
}

/// Opens norms sets registered by path, falling back on the file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryListingOpener {
    listings: HashMap<PathBuf, NormsSet>,
}

impl MemoryListingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, path: impl Into<PathBuf>, norms: NormsSet) -> Self {
        self.listings.insert(path.into(), norms);
        self
    }
}

impl ListingOpener for MemoryListingOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ListingSource>, DiffError> {
        let found = self.listings.get(path).or_else(|| {
            let name = path.file_name()?;
            self.listings
                .iter()
                .find(|(p, _)| p.file_name() == Some(name))
                .map(|(_, n)| n)
        });
        found
            .cloned()
            .map(|n| Box::new(n) as Box<dyn ListingSource>)
            .ok_or_else(|| DiffError::Listing {
                path: path.display().to_string(),
                message: "no such in-memory listing".to_string(),
            })
    }
}
