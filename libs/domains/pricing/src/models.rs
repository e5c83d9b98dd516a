use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator};
use validator::Validate;

use crate::error::{PricingError, PricingResult};
use crate::usage::UsageTier;

/// Cloud provider enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    /// Fixed comparison order. Ties between providers resolve to the earlier one.
    pub const ALL: [CloudProvider; 3] = [CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp];
}

/// Canonical resource category
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Compute,
    Database,
    Storage,
    Networking,
    Analytics,
    Ai,
    Management,
    Security,
    Other,
}

/// Canonical resource subcategory. Requested resource kinds are expressed in
/// these terms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubCategory {
    VirtualMachines,
    Kubernetes,
    CloudFunctions,
    Relational,
    NoSql,
    Cache,
    BlobStorage,
    BlockStorage,
    Snapshot,
    LoadBalancer,
    ApiGateway,
    DataTransfer,
    Cdn,
    Dns,
    Firewall,
    KeyManagement,
    DataWarehouse,
    Streaming,
    MachineLearning,
    Monitoring,
    Logging,
    Uncategorized,
}

impl SubCategory {
    /// Parent category. Every subcategory belongs to exactly one.
    pub fn category(self) -> Category {
        match self {
            SubCategory::VirtualMachines | SubCategory::Kubernetes | SubCategory::CloudFunctions => {
                Category::Compute
            }
            SubCategory::Relational | SubCategory::NoSql | SubCategory::Cache => Category::Database,
            SubCategory::BlobStorage | SubCategory::BlockStorage | SubCategory::Snapshot => {
                Category::Storage
            }
            SubCategory::LoadBalancer
            | SubCategory::ApiGateway
            | SubCategory::DataTransfer
            | SubCategory::Cdn
            | SubCategory::Dns => Category::Networking,
            SubCategory::Firewall | SubCategory::KeyManagement => Category::Security,
            SubCategory::DataWarehouse | SubCategory::Streaming => Category::Analytics,
            SubCategory::MachineLearning => Category::Ai,
            SubCategory::Monitoring | SubCategory::Logging => Category::Management,
            SubCategory::Uncategorized => Category::Other,
        }
    }

    /// Resource family that decides extraction fields and selection policy.
    pub fn family(self) -> ResourceFamily {
        match self {
            SubCategory::VirtualMachines => ResourceFamily::ComputeInstance,
            SubCategory::Relational | SubCategory::Cache => ResourceFamily::Database,
            SubCategory::LoadBalancer => ResourceFamily::LoadBalancer,
            SubCategory::Monitoring => ResourceFamily::Monitoring,
            SubCategory::CloudFunctions => ResourceFamily::CloudFunction,
            SubCategory::Kubernetes => ResourceFamily::Kubernetes,
            SubCategory::ApiGateway => ResourceFamily::ApiGateway,
            SubCategory::BlobStorage => ResourceFamily::BlobStorage,
            SubCategory::BlockStorage => ResourceFamily::BlockStorage,
            _ => ResourceFamily::Generic,
        }
    }
}

/// Closed set of canonical resource shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceFamily {
    ComputeInstance,
    Database,
    LoadBalancer,
    Monitoring,
    CloudFunction,
    Kubernetes,
    ApiGateway,
    BlobStorage,
    BlockStorage,
    Generic,
}

impl ResourceFamily {
    /// Families that are filtered on vCPU / memory minimums.
    pub fn is_sizing_sensitive(self) -> bool {
        matches!(self, ResourceFamily::ComputeInstance | ResourceFamily::Database)
    }

    /// Families priced from the synthetic reference tables rather than the catalog.
    pub fn is_reference_priced(self) -> bool {
        matches!(self, ResourceFamily::LoadBalancer | ResourceFamily::Monitoring)
    }
}

/// Lowercase alphanumerics only, so `VirtualMachines`, `virtual_machines` and
/// `virtual-machines` compare equal.
fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_lenient<T: IntoEnumIterator + std::fmt::Display>(value: &str) -> Option<T> {
    let wanted = compact(value);
    if wanted.is_empty() {
        return None;
    }
    T::iter().find(|candidate| compact(&candidate.to_string()) == wanted)
}

impl FromStr for SubCategory {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_lenient(s).ok_or_else(|| PricingError::UnknownResourceKind(s.to_string()))
    }
}

impl FromStr for Category {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_lenient(s).ok_or_else(|| PricingError::UnknownCategory(s.to_string()))
    }
}

impl FromStr for CloudProvider {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_lenient(s).ok_or_else(|| PricingError::InvalidInput(format!("unknown provider: {s}")))
    }
}

/// One vendor price line attached to a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    pub amount: Decimal,
    /// Vendor unit string, e.g. "Hrs", "1 GB/Month", "Requests"
    pub unit: String,
    /// Vendor purchase option tag, e.g. "OnDemand", "Reserved", "Consumption"
    #[serde(default)]
    pub purchase_option: Option<String>,
}

impl RawPrice {
    pub fn new(amount: Decimal, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
            purchase_option: None,
        }
    }

    pub fn with_purchase_option(mut self, option: impl Into<String>) -> Self {
        self.purchase_option = Some(option.into());
        self
    }
}

/// A vendor SKU line as supplied by the catalog collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCatalogEntry {
    pub vendor: CloudProvider,
    /// Vendor service name (e.g. "AmazonEC2", "Virtual Machines", "Compute Engine")
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub region: String,
    /// Vendor product family (AWS productFamily, Azure serviceFamily, GCP resourceFamily)
    #[serde(default)]
    pub product_family: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub prices: Vec<RawPrice>,
}

impl RawCatalogEntry {
    pub fn new(
        vendor: CloudProvider,
        product_family: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            vendor,
            service: service.into(),
            region: region.into(),
            product_family: product_family.into(),
            attributes: HashMap::new(),
            prices: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_price(mut self, price: RawPrice) -> Self {
        self.prices.push(price);
        self
    }
}

/// DTO for a cost comparison
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareCostRequest {
    /// Requested subcategories, e.g. `["virtual_machines", "load_balancer"]`
    #[validate(length(max = 32))]
    #[serde(default)]
    pub resources: Vec<String>,
    /// Required; a missing tier is a malformed request
    pub usage: String,
}

impl CompareCostRequest {
    pub fn new<I, S>(resources: I, usage: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            usage: usage.into(),
        }
    }

    /// Parsed kinds in request order. Fails on the first unknown kind.
    pub fn kinds(&self) -> PricingResult<Vec<SubCategory>> {
        self.resources.iter().map(|r| r.parse()).collect()
    }

    pub fn tier(&self) -> PricingResult<UsageTier> {
        self.usage.parse()
    }
}

/// DTO for browsing normalized inventory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InventoryRequest {
    /// Empty means every category
    #[validate(length(max = 32))]
    #[serde(default)]
    pub categories: Vec<String>,
    /// Required; a missing tier is a malformed request
    pub usage: String,
}

impl InventoryRequest {
    pub fn new<I, S>(categories: I, usage: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            usage: usage.into(),
        }
    }

    pub fn categories(&self) -> PricingResult<Vec<Category>> {
        self.categories.iter().map(|c| c.parse()).collect()
    }

    pub fn tier(&self) -> PricingResult<UsageTier> {
        self.usage.parse()
    }
}
