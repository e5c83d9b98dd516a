//! Whole-catalog normalization and per-provider cost comparison.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::models::{Category, CloudProvider, RawCatalogEntry, SubCategory};
use crate::reference::reference_resources;
use crate::resource::{CanonicalResource, normalize_entry};
use crate::selector::ResourceSelection;
use crate::usage::UsageTier;

/// One line of a provider's cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdownEntry {
    /// Requested resource kind
    pub resource: SubCategory,
    pub cost: Decimal,
    /// Serialized snapshot of the selected resource; absent on no match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Monthly total for one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCost {
    pub provider: CloudProvider,
    /// Exact sum of `breakdown` costs
    pub total: Decimal,
    pub breakdown: Vec<CostBreakdownEntry>,
}

impl ProviderCost {
    /// Sum the breakdown with checked addition. An entry that would overflow
    /// the total is recorded as a no match, so `total` stays the exact sum.
    fn from_breakdown(provider: CloudProvider, entries: Vec<CostBreakdownEntry>) -> Self {
        let mut total = Decimal::ZERO;
        let mut breakdown = Vec::with_capacity(entries.len());
        for entry in entries {
            match total.checked_add(entry.cost) {
                Some(sum) => {
                    total = sum;
                    breakdown.push(entry);
                }
                None => {
                    warn!(%provider, kind = %entry.resource, "cost overflows provider total");
                    breakdown.push(CostBreakdownEntry {
                        resource: entry.resource,
                        cost: Decimal::ZERO,
                        detail: None,
                    });
                }
            }
        }
        Self {
            provider,
            total,
            breakdown,
        }
    }

    /// Requested kinds with no qualifying resource.
    pub fn unmatched(&self) -> impl Iterator<Item = SubCategory> + '_ {
        self.breakdown
            .iter()
            .filter(|entry| entry.detail.is_none())
            .map(|entry| entry.resource)
    }
}

/// Result of comparing a set of resource kinds across all providers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComparisonResult {
    pub usage: UsageTier,
    pub requested: Vec<SubCategory>,
    /// One entry per provider, in fixed provider order
    pub providers: Vec<ProviderCost>,
}

impl CostComparisonResult {
    pub fn provider(&self, provider: CloudProvider) -> Option<&ProviderCost> {
        self.providers.iter().find(|p| p.provider == provider)
    }

    /// Provider with the lowest total; ties go to the earlier provider.
    pub fn cheapest(&self) -> Option<&ProviderCost> {
        self.providers.iter().min_by_key(|p| p.total)
    }
}

/// Normalized resources of one category, for inventory browsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInventory {
    pub category: Category,
    pub resources: Vec<CanonicalResource>,
}

/// Normalized catalog partitioned by (provider, subcategory).
///
/// Reference-priced kinds are served from the reference tables for the tier
/// the index was built for; catalog entries of those kinds are kept for
/// inventory browsing only.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    tier: UsageTier,
    pools: HashMap<(CloudProvider, SubCategory), Vec<CanonicalResource>>,
    references: HashMap<SubCategory, Vec<CanonicalResource>>,
    resources: usize,
    uncategorized: usize,
}

impl ResourceIndex {
    pub fn build(catalog: &[RawCatalogEntry], tier: UsageTier) -> Self {
        let mut index = ResourceIndex {
            tier,
            ..ResourceIndex::default()
        };

        for resource in catalog.iter().map(normalize_entry) {
            if resource.sub_category == SubCategory::Uncategorized {
                index.uncategorized += 1;
            }
            index.resources += 1;
            index
                .pools
                .entry((resource.cloud, resource.sub_category))
                .or_default()
                .push(resource);
        }

        for kind in [SubCategory::LoadBalancer, SubCategory::Monitoring] {
            index.references.insert(kind, reference_resources(kind, tier));
        }

        debug!(
            resources = index.resources,
            uncategorized = index.uncategorized,
            pools = index.pools.len(),
            "normalized catalog"
        );
        index
    }

    /// Catalog-derived resources count (reference entries excluded).
    pub fn len(&self) -> usize {
        self.resources
    }

    pub fn is_empty(&self) -> bool {
        self.resources == 0
    }

    pub fn uncategorized(&self) -> usize {
        self.uncategorized
    }

    /// Candidate pool used for selection.
    pub fn selection_pool(&self, provider: CloudProvider, kind: SubCategory) -> &[CanonicalResource] {
        let pool = if kind.family().is_reference_priced() {
            self.references.get(&kind)
        } else {
            self.pools.get(&(provider, kind))
        };
        pool.map(Vec::as_slice).unwrap_or_default()
    }

    pub fn tier(&self) -> UsageTier {
        self.tier
    }
}

fn snapshot(resource: &CanonicalResource) -> Option<serde_json::Value> {
    match serde_json::to_value(resource) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(name = %resource.name, error = %e, "failed to serialize selected resource");
            None
        }
    }
}

fn provider_cost(
    index: &ResourceIndex,
    provider: CloudProvider,
    kinds: &[SubCategory],
    tier: UsageTier,
) -> ProviderCost {
    let breakdown = kinds
        .iter()
        .map(|&kind| {
            let selection = ResourceSelection::resolve(index.selection_pool(provider, kind), provider, kind, tier);
            match selection.resource {
                Some(resource) => {
                    debug!(%provider, %kind, name = %resource.name, cost = %selection.cost, "selected resource");
                    CostBreakdownEntry {
                        resource: kind,
                        cost: selection.cost,
                        detail: snapshot(resource),
                    }
                }
                None => {
                    debug!(%provider, %kind, %tier, "no resource satisfies constraints");
                    CostBreakdownEntry {
                        resource: kind,
                        cost: Decimal::ZERO,
                        detail: None,
                    }
                }
            }
        })
        .collect();

    ProviderCost::from_breakdown(provider, breakdown)
}

/// Compare the monthly cost of `kinds` across every provider at the tier the
/// index was built for.
pub fn compare_indexed(index: &ResourceIndex, kinds: &[SubCategory]) -> CostComparisonResult {
    let tier = index.tier;
    let providers = CloudProvider::ALL
        .iter()
        .map(|&provider| provider_cost(index, provider, kinds, tier))
        .collect::<Vec<_>>();

    for p in &providers {
        info!(provider = %p.provider, total = %p.total, entries = p.breakdown.len(), "provider total");
    }

    CostComparisonResult {
        usage: tier,
        requested: kinds.to_vec(),
        providers,
    }
}

/// Normalize `catalog` once and compare `kinds` at `tier`.
pub fn compare_cost(catalog: &[RawCatalogEntry], kinds: &[SubCategory], tier: UsageTier) -> CostComparisonResult {
    let index = ResourceIndex::build(catalog, tier);
    compare_indexed(&index, kinds)
}

/// Normalized inventory grouped by category.
///
/// An empty `categories` list means every category, in canonical order.
/// Within a group, catalog-derived resources come first in catalog order,
/// then reference resources for the tier.
pub fn normalize(catalog: &[RawCatalogEntry], categories: &[Category], tier: UsageTier) -> Vec<CategoryInventory> {
    use strum::IntoEnumIterator;

    let wanted: Vec<Category> = if categories.is_empty() {
        Category::iter().collect()
    } else {
        categories.to_vec()
    };

    let resources: Vec<CanonicalResource> = catalog.iter().map(normalize_entry).collect();

    wanted
        .into_iter()
        .map(|category| {
            let mut group: Vec<CanonicalResource> = resources
                .iter()
                .filter(|r| r.category == category)
                .cloned()
                .collect();

            for kind in SubCategory::iter().filter(|k| k.category() == category) {
                group.extend(reference_resources(kind, tier));
            }

            CategoryInventory {
                category,
                resources: group,
            }
        })
        .collect()
}
