//! Canonical resources: the vendor-neutral record built from one catalog entry.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::classifier::classify;
use crate::extractor::{self, ExtractedAttributes, KeyChain, keys};
use crate::models::{Category, CloudProvider, RawCatalogEntry, ResourceFamily, SubCategory};
use crate::price::{PriceSheet, normalize_prices};

/// Family-specific fields, dispatched on the subcategory's family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ResourceDetails {
    ComputeInstance {
        #[serde(skip_serializing_if = "Option::is_none")]
        operating_system: Option<String>,
    },
    Database {
        #[serde(skip_serializing_if = "Option::is_none")]
        engine: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deployment_option: Option<String>,
    },
    LoadBalancer {
        #[serde(skip_serializing_if = "Option::is_none")]
        load_balancer_type: Option<String>,
    },
    Monitoring {
        #[serde(skip_serializing_if = "Option::is_none")]
        plan: Option<String>,
    },
    CloudFunction {
        #[serde(skip_serializing_if = "Option::is_none")]
        runtime: Option<String>,
    },
    Kubernetes {
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster_tier: Option<String>,
    },
    ApiGateway {
        #[serde(skip_serializing_if = "Option::is_none")]
        api_type: Option<String>,
    },
    BlobStorage {
        #[serde(skip_serializing_if = "Option::is_none")]
        storage_class: Option<String>,
    },
    BlockStorage {
        #[serde(skip_serializing_if = "Option::is_none")]
        volume_type: Option<String>,
    },
    Generic,
}

impl ResourceDetails {
    pub fn family(&self) -> ResourceFamily {
        match self {
            ResourceDetails::ComputeInstance { .. } => ResourceFamily::ComputeInstance,
            ResourceDetails::Database { .. } => ResourceFamily::Database,
            ResourceDetails::LoadBalancer { .. } => ResourceFamily::LoadBalancer,
            ResourceDetails::Monitoring { .. } => ResourceFamily::Monitoring,
            ResourceDetails::CloudFunction { .. } => ResourceFamily::CloudFunction,
            ResourceDetails::Kubernetes { .. } => ResourceFamily::Kubernetes,
            ResourceDetails::ApiGateway { .. } => ResourceFamily::ApiGateway,
            ResourceDetails::BlobStorage { .. } => ResourceFamily::BlobStorage,
            ResourceDetails::BlockStorage { .. } => ResourceFamily::BlockStorage,
            ResourceDetails::Generic => ResourceFamily::Generic,
        }
    }

    fn from_entry(entry: &RawCatalogEntry, family: ResourceFamily, extracted: &ExtractedAttributes) -> Self {
        let field = |chain: &KeyChain| {
            extractor::lookup(&entry.attributes, entry.vendor, chain).map(str::to_string)
        };

        match family {
            ResourceFamily::ComputeInstance => ResourceDetails::ComputeInstance {
                operating_system: field(&keys::OPERATING_SYSTEM),
            },
            ResourceFamily::Database => ResourceDetails::Database {
                engine: extracted.database_engine.clone(),
                deployment_option: field(&keys::DEPLOYMENT_OPTION),
            },
            ResourceFamily::LoadBalancer => ResourceDetails::LoadBalancer {
                load_balancer_type: field(&keys::LOAD_BALANCER_TYPE),
            },
            ResourceFamily::Monitoring => ResourceDetails::Monitoring { plan: None },
            ResourceFamily::CloudFunction => ResourceDetails::CloudFunction {
                runtime: field(&keys::RUNTIME),
            },
            ResourceFamily::Kubernetes => ResourceDetails::Kubernetes {
                cluster_tier: field(&keys::CLUSTER_TIER),
            },
            ResourceFamily::ApiGateway => ResourceDetails::ApiGateway {
                api_type: field(&keys::API_TYPE),
            },
            ResourceFamily::BlobStorage => ResourceDetails::BlobStorage {
                storage_class: field(&keys::STORAGE_CLASS),
            },
            ResourceFamily::BlockStorage => ResourceDetails::BlockStorage {
                volume_type: field(&keys::VOLUME_TYPE),
            },
            ResourceFamily::Generic => ResourceDetails::Generic,
        }
    }
}

/// Vendor-neutral priced offering. Built per request, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResource {
    pub cloud: CloudProvider,
    pub category: Category,
    pub sub_category: SubCategory,
    pub region: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpu: Option<u32>,
    /// Free-text size such as "4 GB"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(flatten)]
    pub prices: PriceSheet,
    #[serde(flatten)]
    pub details: ResourceDetails,
}

impl CanonicalResource {
    pub fn family(&self) -> ResourceFamily {
        self.sub_category.family()
    }

    /// Leading whitespace-delimited token of `memory` as GB.
    /// Unparsable or absent memory counts as zero.
    pub fn memory_gb(&self) -> Decimal {
        self.memory
            .as_deref()
            .and_then(|memory| memory.split_whitespace().next())
            .and_then(|token| Decimal::from_str(token).ok())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Classify, extract and price one raw entry.
pub fn normalize_entry(entry: &RawCatalogEntry) -> CanonicalResource {
    let classification = classify(entry.vendor, &entry.product_family, &entry.service);
    let family = classification.sub_category.family();
    let extracted = extractor::extract(entry);
    let prices = normalize_prices(
        &entry.prices,
        extracted.description.as_deref(),
        classification.sub_category,
    );
    let details = ResourceDetails::from_entry(entry, family, &extracted);

    let name = extracted
        .name
        .clone()
        .or_else(|| Some(entry.service.trim().to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| classification.sub_category.to_string());

    CanonicalResource {
        cloud: entry.vendor,
        category: classification.category,
        sub_category: classification.sub_category,
        region: entry.region.clone(),
        name,
        vcpu: extracted.vcpu,
        memory: extracted.memory,
        prices,
        details,
    }
}
