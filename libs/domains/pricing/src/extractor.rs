//! Canonical sizing fields from vendor attribute bags.
//!
//! Every field is resolved through an ordered [`KeyChain`]: vendor-agnostic
//! keys first, then the vendor's own synonyms. The first present, non-blank
//! value wins. When no key yields a value, a small set of vendor-specific text
//! heuristics is tried. Nothing here fails; an unresolved field stays `None`.

use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::models::{CloudProvider, RawCatalogEntry};

/// Ordered attribute keys for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct KeyChain {
    pub common: &'static [&'static str],
    pub aws: &'static [&'static str],
    pub azure: &'static [&'static str],
    pub gcp: &'static [&'static str],
}

impl KeyChain {
    /// Keys in lookup order for a vendor.
    pub fn keys(&self, vendor: CloudProvider) -> impl Iterator<Item = &'static str> + '_ {
        let vendor_keys = match vendor {
            CloudProvider::Aws => self.aws,
            CloudProvider::Azure => self.azure,
            CloudProvider::Gcp => self.gcp,
        };
        self.common.iter().chain(vendor_keys.iter()).copied()
    }
}

pub mod keys {
    use super::KeyChain;

    pub const NAME: KeyChain = KeyChain {
        common: &["instanceType", "name"],
        aws: &["usagetype", "group"],
        azure: &["vmSize", "armSkuName", "skuName", "meterName", "productName"],
        gcp: &["machineType", "resourceGroup"],
    };

    pub const VCPU: KeyChain = KeyChain {
        common: &["vcpu", "vCPU"],
        aws: &[],
        azure: &["vCPUs", "numberOfCores"],
        gcp: &["cpus", "guestCpus"],
    };

    pub const MEMORY: KeyChain = KeyChain {
        common: &["memory"],
        aws: &[],
        azure: &["memoryInGB", "memoryGB"],
        gcp: &["memoryGb"],
    };

    pub const DATABASE_ENGINE: KeyChain = KeyChain {
        common: &["databaseEngine", "engine"],
        aws: &["cacheEngine"],
        azure: &[],
        gcp: &[],
    };

    pub const DESCRIPTION: KeyChain = KeyChain {
        common: &["description"],
        aws: &["groupDescription", "usagetype"],
        azure: &["meterName", "productName"],
        gcp: &[],
    };

    pub const MACHINE_TYPE: KeyChain = KeyChain {
        common: &[],
        aws: &[],
        azure: &[],
        gcp: &["machineType", "instanceType"],
    };

    pub const SKU_NAME: KeyChain = KeyChain {
        common: &[],
        aws: &[],
        azure: &["skuName"],
        gcp: &[],
    };

    pub const OPERATING_SYSTEM: KeyChain = KeyChain {
        common: &["operatingSystem", "os"],
        aws: &[],
        azure: &[],
        gcp: &[],
    };

    pub const DEPLOYMENT_OPTION: KeyChain = KeyChain {
        common: &["deploymentOption"],
        aws: &[],
        azure: &[],
        gcp: &["availabilityType"],
    };

    pub const STORAGE_CLASS: KeyChain = KeyChain {
        common: &["storageClass"],
        aws: &["volumeType"],
        azure: &["accessTier", "tier"],
        gcp: &[],
    };

    pub const VOLUME_TYPE: KeyChain = KeyChain {
        common: &["volumeType"],
        aws: &["volumeApiName"],
        azure: &["diskType", "skuName"],
        gcp: &["diskType"],
    };

    pub const LOAD_BALANCER_TYPE: KeyChain = KeyChain {
        common: &["loadBalancerType"],
        aws: &["usagetype"],
        azure: &["skuName"],
        gcp: &[],
    };

    pub const API_TYPE: KeyChain = KeyChain {
        common: &["apiType"],
        aws: &["operation"],
        azure: &["skuName"],
        gcp: &[],
    };

    pub const CLUSTER_TIER: KeyChain = KeyChain {
        common: &["tier"],
        aws: &["usagetype"],
        azure: &["skuName"],
        gcp: &[],
    };

    pub const RUNTIME: KeyChain = KeyChain {
        common: &["runtime"],
        aws: &["group"],
        azure: &[],
        gcp: &[],
    };
}

/// First present, non-blank value for the given keys, trimmed.
pub fn first_non_blank<'a, I>(attrs: &'a HashMap<String, String>, keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'static str>,
{
    keys.into_iter()
        .filter_map(|key| attrs.get(key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// Walk a [`KeyChain`] for a vendor.
pub fn lookup<'a>(
    attrs: &'a HashMap<String, String>,
    vendor: CloudProvider,
    chain: &KeyChain,
) -> Option<&'a str> {
    first_non_blank(attrs, chain.keys(vendor))
}

// ---------------------------------------------------------------------------
// Text heuristics
// ---------------------------------------------------------------------------

/// `"<N> vCPU + <M>GB RAM"` in GCP SKU descriptions
static GCP_VCPU_RAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*vCPU\s*\+\s*(\d+(?:\.\d+)?)\s*GB\s*RAM").unwrap()
});

/// `"<N> vCore"` in Azure SKU names
static AZURE_VCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*vCore").unwrap());

/// vCPU count from a GCP description such as `"N2 Instance: 4 vCPU + 16GB RAM"`.
pub fn extract_gcp_vcpu_from_description(description: &str) -> Option<u32> {
    GCP_VCPU_RAM
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Memory in GB from a GCP description such as `"N2 Instance: 4 vCPU + 16GB RAM"`.
pub fn extract_gcp_memory_from_description(description: &str) -> Option<Decimal> {
    GCP_VCPU_RAM
        .captures(description)
        .and_then(|caps| caps.get(2))
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}

/// Trailing numeric component of a machine type: `n1-standard-4` -> 4.
pub fn infer_vcpu_from_machine_type(machine_type: &str) -> Option<u32> {
    machine_type.trim().rsplit('-').next()?.parse().ok()
}

/// Heuristic GB-per-vCPU ratio keyed on the machine-type family name.
/// These defaults are reproduced as-is for pricing parity.
pub fn gcp_memory_per_vcpu(machine_type: &str) -> Decimal {
    let lower = machine_type.to_ascii_lowercase();
    if lower.contains("highcpu") {
        Decimal::from(2)
    } else if lower.contains("highmem") {
        Decimal::from(8)
    } else if lower.contains("ultramem") {
        Decimal::from(25)
    } else {
        Decimal::from(4)
    }
}

/// Estimated memory for a machine type: inferred vCPU x per-vCPU ratio.
pub fn estimate_gcp_memory_from_machine_type(machine_type: &str) -> Option<Decimal> {
    let vcpu = infer_vcpu_from_machine_type(machine_type)?;
    Decimal::from(vcpu).checked_mul(gcp_memory_per_vcpu(machine_type))
}

/// vCore count from an Azure SKU name such as `"4 vCore"`.
pub fn extract_azure_vcore_count(sku_name: &str) -> Option<u32> {
    AZURE_VCORE
        .captures(sku_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Database engine implied by an Azure service name.
pub fn infer_azure_database_engine(service: &str) -> Option<String> {
    if service.contains("SQL Database") {
        return Some("SQL Server".to_string());
    }
    service
        .strip_prefix("Azure Database for ")
        .map(str::trim)
        .filter(|engine| !engine.is_empty())
        .map(str::to_string)
}

/// Database engine mentioned in a GCP description. Checked in a fixed order.
pub fn scan_gcp_database_engine(description: &str) -> Option<String> {
    ["MySQL", "PostgreSQL", "SQL Server"]
        .into_iter()
        .find(|engine| description.contains(engine))
        .map(str::to_string)
}

/// `"16"` -> `"16 GB"`; anything else is kept as written.
fn format_memory(raw: &str) -> String {
    match Decimal::from_str(raw) {
        Ok(value) => format_memory_gb(value),
        Err(_) => raw.to_string(),
    }
}

fn format_memory_gb(value: Decimal) -> String {
    format!("{} GB", value.normalize())
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Canonical fields resolved for one catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAttributes {
    pub name: Option<String>,
    pub vcpu: Option<u32>,
    /// Free-text size, e.g. "4 GB" or "3.75 GiB"
    pub memory: Option<String>,
    pub database_engine: Option<String>,
    pub description: Option<String>,
}

/// Resolve name, vCPU, memory, engine and description for an entry.
pub fn extract(entry: &RawCatalogEntry) -> ExtractedAttributes {
    let attrs = &entry.attributes;
    let vendor = entry.vendor;
    let description = lookup(attrs, vendor, &keys::DESCRIPTION).map(str::to_string);

    ExtractedAttributes {
        name: lookup(attrs, vendor, &keys::NAME).map(str::to_string),
        vcpu: extract_vcpu(entry, description.as_deref()),
        memory: extract_memory(entry, description.as_deref()),
        database_engine: extract_database_engine(entry, description.as_deref()),
        description,
    }
}

fn extract_vcpu(entry: &RawCatalogEntry, description: Option<&str>) -> Option<u32> {
    let attrs = &entry.attributes;
    if let Some(vcpu) = lookup(attrs, entry.vendor, &keys::VCPU).and_then(|v| v.parse().ok()) {
        return Some(vcpu);
    }

    match entry.vendor {
        CloudProvider::Gcp => description
            .and_then(extract_gcp_vcpu_from_description)
            .or_else(|| {
                lookup(attrs, entry.vendor, &keys::MACHINE_TYPE)
                    .and_then(infer_vcpu_from_machine_type)
            }),
        CloudProvider::Azure => {
            lookup(attrs, entry.vendor, &keys::SKU_NAME).and_then(extract_azure_vcore_count)
        }
        CloudProvider::Aws => None,
    }
}

fn extract_memory(entry: &RawCatalogEntry, description: Option<&str>) -> Option<String> {
    let attrs = &entry.attributes;
    if let Some(memory) = lookup(attrs, entry.vendor, &keys::MEMORY) {
        return Some(format_memory(memory));
    }

    match entry.vendor {
        CloudProvider::Gcp => description
            .and_then(extract_gcp_memory_from_description)
            .or_else(|| {
                lookup(attrs, entry.vendor, &keys::MACHINE_TYPE)
                    .and_then(estimate_gcp_memory_from_machine_type)
            })
            .map(format_memory_gb),
        CloudProvider::Aws | CloudProvider::Azure => None,
    }
}

fn extract_database_engine(entry: &RawCatalogEntry, description: Option<&str>) -> Option<String> {
    if let Some(engine) = lookup(&entry.attributes, entry.vendor, &keys::DATABASE_ENGINE) {
        return Some(engine.to_string());
    }

    match entry.vendor {
        CloudProvider::Azure => infer_azure_database_engine(&entry.service),
        CloudProvider::Gcp => description.and_then(scan_gcp_database_engine),
        CloudProvider::Aws => None,
    }
}
