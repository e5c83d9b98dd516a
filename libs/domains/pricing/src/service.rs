use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::aggregator::{self, CategoryInventory, CostComparisonResult};
use crate::catalog::Catalog;
use crate::error::PricingResult;
use crate::models::{CompareCostRequest, InventoryRequest};

/// Service facade: validates requests, fetches the catalog once, runs the engine
#[derive(Clone)]
pub struct PricingService<C: Catalog> {
    catalog: Arc<C>,
}

impl<C: Catalog> PricingService<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Monthly cost of the requested kinds for every provider.
    ///
    /// Unknown kinds and tiers are rejected before the catalog is touched.
    #[instrument(skip(self, request), fields(usage = %request.usage, kinds = request.resources.len()))]
    pub async fn compare_cost(&self, request: CompareCostRequest) -> PricingResult<CostComparisonResult> {
        request.validate()?;
        let kinds = request.kinds()?;
        let tier = request.tier()?;

        let entries = self.catalog.fetch_all().await?;
        info!(entries = entries.len(), "catalog fetched");

        Ok(aggregator::compare_cost(&entries, &kinds, tier))
    }

    /// Normalized inventory grouped by category.
    #[instrument(skip(self, request), fields(usage = %request.usage))]
    pub async fn normalize(&self, request: InventoryRequest) -> PricingResult<Vec<CategoryInventory>> {
        request.validate()?;
        let categories = request.categories()?;
        let tier = request.tier()?;

        let entries = self.catalog.fetch_all().await?;
        info!(entries = entries.len(), "catalog fetched");

        Ok(aggregator::normalize(&entries, &categories, tier))
    }
}
