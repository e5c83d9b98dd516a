//! JSON file catalog

use async_trait::async_trait;
use domain_pricing::{Catalog, PricingError, PricingResult, RawCatalogEntry};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Catalog backed by a JSON array of raw SKU lines on disk.
///
/// The file is re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Catalog for JsonFileCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_all(&self) -> PricingResult<Vec<RawCatalogEntry>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| PricingError::Catalog(format!("{}: {e}", self.path.display())))?;

        let entries: Vec<RawCatalogEntry> = serde_json::from_slice(&bytes)
            .map_err(|e| PricingError::Catalog(format!("{}: {e}", self.path.display())))?;

        debug!(entries = entries.len(), "Loaded catalog file");
        Ok(entries)
    }
}
