use async_trait::async_trait;

use crate::error::PricingResult;
use crate::models::RawCatalogEntry;

/// Source of raw catalog entries.
///
/// Implementations own retrieval, batching and caching. The engine only needs
/// the fully materialized list for the providers being compared.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every raw entry currently known to the catalog
    async fn fetch_all(&self) -> PricingResult<Vec<RawCatalogEntry>>;
}

/// Catalog held in memory, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<RawCatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<RawCatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RawCatalogEntry> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = RawCatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn fetch_all(&self) -> PricingResult<Vec<RawCatalogEntry>> {
        Ok(self.entries.clone())
    }
}
