//! Pricing Domain
//!
//! Catalog normalization and price-selection engine. Raw vendor SKU lines are
//! classified, their attributes and prices normalized into canonical
//! resources, and the cheapest qualifying resource per provider and requested
//! kind is folded into a monthly cost comparison.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Request validation, catalog fetch
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Aggregator  │  ← Normalize once, partition, per-provider totals
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Selector   │  ← Sizing / reference / scored / generic policies
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────────────────────┐
//! │ Classifier · Extractor · Normalizer │  ← Pure per-entry transforms
//! └─────────────────────────────────────┘
//! ```
//!
//! Every engine function is synchronous and deterministic; only
//! [`Catalog::fetch_all`] is async.

pub mod aggregator;
pub mod catalog;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod models;
pub mod price;
pub mod reference;
pub mod resource;
pub mod selector;
pub mod service;
pub mod usage;

// Re-export commonly used types
pub use aggregator::{
    CategoryInventory, CostBreakdownEntry, CostComparisonResult, ProviderCost, ResourceIndex,
    compare_cost, normalize,
};
pub use catalog::{Catalog, InMemoryCatalog};
pub use classifier::{Classification, classify, verify_rule_tables};
pub use error::{PricingError, PricingResult};
pub use models::{
    Category, CloudProvider, CompareCostRequest, InventoryRequest, RawCatalogEntry, RawPrice,
    ResourceFamily, SubCategory,
};
pub use price::{HOURS_PER_MONTH, PriceKind, PriceSheet};
pub use resource::{CanonicalResource, ResourceDetails, normalize_entry};
pub use selector::ResourceSelection;
pub use service::PricingService;
pub use usage::{NonMonotonicTier, TierSpec, UsageProfile, UsageTier, verify_usage_tables};
