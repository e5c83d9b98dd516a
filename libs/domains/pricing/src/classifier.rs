//! Vendor taxonomy -> canonical (Category, SubCategory).
//!
//! Each vendor owns one exact-match table keyed by `(product_family, service)`.
//! Keys are case-sensitive. Tables are built once and must not contain the same
//! key twice; a duplicate aborts startup instead of letting the last rule win.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::{Category, CloudProvider, SubCategory};

/// Canonical classification of a raw catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub category: Category,
    pub sub_category: SubCategory,
}

impl Classification {
    pub const UNCATEGORIZED: Classification = Classification {
        category: Category::Other,
        sub_category: SubCategory::Uncategorized,
    };

    fn of(sub_category: SubCategory) -> Self {
        Self {
            category: sub_category.category(),
            sub_category,
        }
    }
}

/// `(product_family, service) -> subcategory`
pub type Rule = (&'static str, &'static str, SubCategory);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate {vendor} classification rule ({product_family:?}, {service:?})")]
pub struct DuplicateRule {
    pub vendor: CloudProvider,
    pub product_family: &'static str,
    pub service: &'static str,
}

const AWS_RULES: &[Rule] = &[
    ("Compute Instance", "AmazonEC2", SubCategory::VirtualMachines),
    ("Storage", "AmazonEC2", SubCategory::BlockStorage),
    ("System Operation", "AmazonEC2", SubCategory::BlockStorage),
    ("Storage Snapshot", "AmazonEC2", SubCategory::Snapshot),
    ("Load Balancer", "AWSELB", SubCategory::LoadBalancer),
    ("Load Balancer-Application", "AWSELB", SubCategory::LoadBalancer),
    ("Load Balancer-Network", "AWSELB", SubCategory::LoadBalancer),
    ("Database Instance", "AmazonRDS", SubCategory::Relational),
    ("Cache Instance", "AmazonElastiCache", SubCategory::Cache),
    ("Amazon DynamoDB PayPerRequest Throughput", "AmazonDynamoDB", SubCategory::NoSql),
    ("Storage", "AmazonS3", SubCategory::BlobStorage),
    ("API Request", "AmazonS3", SubCategory::BlobStorage),
    ("Serverless", "AWSLambda", SubCategory::CloudFunctions),
    ("Compute", "AmazonEKS", SubCategory::Kubernetes),
    ("API Calls", "AmazonApiGateway", SubCategory::ApiGateway),
    ("Data Transfer", "AWSDataTransfer", SubCategory::DataTransfer),
    ("Data Transfer", "AmazonCloudFront", SubCategory::Cdn),
    ("DNS Query", "AmazonRoute53", SubCategory::Dns),
    ("Metric", "AmazonCloudWatch", SubCategory::Monitoring),
    ("Storage Snapshot", "AmazonCloudWatch", SubCategory::Logging),
    ("Web Application Firewall", "awswaf", SubCategory::Firewall),
    ("Encryption Key", "awskms", SubCategory::KeyManagement),
    ("Compute Instance", "AmazonRedshift", SubCategory::DataWarehouse),
    ("Kinesis Streams", "AmazonKinesis", SubCategory::Streaming),
    ("ML Instance", "AmazonSageMaker", SubCategory::MachineLearning),
];

const AZURE_RULES: &[Rule] = &[
    ("Compute", "Virtual Machines", SubCategory::VirtualMachines),
    ("Compute", "Functions", SubCategory::CloudFunctions),
    ("Containers", "Azure Kubernetes Service", SubCategory::Kubernetes),
    ("Databases", "Azure Database for PostgreSQL", SubCategory::Relational),
    ("Databases", "Azure Database for MySQL", SubCategory::Relational),
    ("Databases", "SQL Database", SubCategory::Relational),
    ("Databases", "Azure Cosmos DB", SubCategory::NoSql),
    ("Databases", "Redis Cache", SubCategory::Cache),
    ("Storage", "Storage", SubCategory::BlobStorage),
    ("Storage", "Managed Disks", SubCategory::BlockStorage),
    ("Storage", "Backup", SubCategory::Snapshot),
    ("Networking", "Load Balancer", SubCategory::LoadBalancer),
    ("Networking", "Application Gateway", SubCategory::LoadBalancer),
    ("Networking", "Bandwidth", SubCategory::DataTransfer),
    ("Networking", "Content Delivery Network", SubCategory::Cdn),
    ("Networking", "Azure DNS", SubCategory::Dns),
    ("Networking", "Azure Firewall", SubCategory::Firewall),
    ("Integration", "API Management", SubCategory::ApiGateway),
    ("Management and Governance", "Azure Monitor", SubCategory::Monitoring),
    ("Management and Governance", "Log Analytics", SubCategory::Logging),
    ("Analytics", "Azure Synapse Analytics", SubCategory::DataWarehouse),
    ("Analytics", "Event Hubs", SubCategory::Streaming),
    ("AI + Machine Learning", "Azure Machine Learning", SubCategory::MachineLearning),
    ("Security", "Key Vault", SubCategory::KeyManagement),
];

const GCP_RULES: &[Rule] = &[
    ("Compute", "Compute Engine", SubCategory::VirtualMachines),
    ("Storage", "Compute Engine", SubCategory::BlockStorage),
    ("Network", "Compute Engine", SubCategory::DataTransfer),
    ("Storage", "Cloud Storage", SubCategory::BlobStorage),
    ("Compute", "Cloud Functions", SubCategory::CloudFunctions),
    ("Compute", "Kubernetes Engine", SubCategory::Kubernetes),
    ("ApplicationServices", "Cloud SQL", SubCategory::Relational),
    ("ApplicationServices", "Cloud Memorystore for Redis", SubCategory::Cache),
    ("ApplicationServices", "Cloud Firestore", SubCategory::NoSql),
    ("ApplicationServices", "API Gateway", SubCategory::ApiGateway),
    ("ApplicationServices", "Cloud Monitoring", SubCategory::Monitoring),
    ("ApplicationServices", "Cloud Logging", SubCategory::Logging),
    ("ApplicationServices", "BigQuery", SubCategory::DataWarehouse),
    ("ApplicationServices", "Cloud Pub/Sub", SubCategory::Streaming),
    ("ApplicationServices", "Vertex AI", SubCategory::MachineLearning),
    ("ApplicationServices", "Cloud Key Management Service (KMS)", SubCategory::KeyManagement),
    ("Network", "Cloud Load Balancing", SubCategory::LoadBalancer),
    ("Network", "Cloud CDN", SubCategory::Cdn),
    ("Network", "Cloud DNS", SubCategory::Dns),
    ("Network", "Cloud Armor", SubCategory::Firewall),
];

/// Exact-match lookup table for one vendor
#[derive(Debug)]
pub struct RuleTable {
    vendor: CloudProvider,
    /// product_family -> service -> subcategory
    rules: HashMap<&'static str, HashMap<&'static str, SubCategory>>,
    len: usize,
}

impl RuleTable {
    /// Build a table, rejecting duplicate keys.
    pub fn build(vendor: CloudProvider, rules: &[Rule]) -> Result<Self, DuplicateRule> {
        let mut map: HashMap<&'static str, HashMap<&'static str, SubCategory>> = HashMap::new();
        for &(product_family, service, sub_category) in rules {
            let services = map.entry(product_family).or_default();
            if services.insert(service, sub_category).is_some() {
                return Err(DuplicateRule {
                    vendor,
                    product_family,
                    service,
                });
            }
        }
        Ok(Self {
            vendor,
            rules: map,
            len: rules.len(),
        })
    }

    pub fn vendor(&self) -> CloudProvider {
        self.vendor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn lookup(&self, product_family: &str, service: &str) -> Option<SubCategory> {
        self.rules.get(product_family)?.get(service).copied()
    }
}

fn rules_for(vendor: CloudProvider) -> &'static [Rule] {
    match vendor {
        CloudProvider::Aws => AWS_RULES,
        CloudProvider::Azure => AZURE_RULES,
        CloudProvider::Gcp => GCP_RULES,
    }
}

fn build_or_abort(vendor: CloudProvider) -> RuleTable {
    RuleTable::build(vendor, rules_for(vendor)).unwrap_or_else(|err| panic!("{err}"))
}

static AWS_TABLE: LazyLock<RuleTable> = LazyLock::new(|| build_or_abort(CloudProvider::Aws));
static AZURE_TABLE: LazyLock<RuleTable> = LazyLock::new(|| build_or_abort(CloudProvider::Azure));
static GCP_TABLE: LazyLock<RuleTable> = LazyLock::new(|| build_or_abort(CloudProvider::Gcp));

/// The rule table for a vendor.
pub fn table(vendor: CloudProvider) -> &'static RuleTable {
    match vendor {
        CloudProvider::Aws => &AWS_TABLE,
        CloudProvider::Azure => &AZURE_TABLE,
        CloudProvider::Gcp => &GCP_TABLE,
    }
}

/// Rebuild every vendor table and report the first duplicate key, if any.
/// Returns the total rule count on success.
pub fn verify_rule_tables() -> Result<usize, DuplicateRule> {
    CloudProvider::ALL.iter().try_fold(0, |total, &vendor| {
        RuleTable::build(vendor, rules_for(vendor)).map(|t| total + t.len())
    })
}

/// Azure lists some SQL SKUs under generic service families; the service
/// name alone identifies them as relational databases.
fn azure_database_override(service: &str) -> Option<SubCategory> {
    (service.contains("SQL Database") || service.starts_with("Azure Database for"))
        .then_some(SubCategory::Relational)
}

/// Classify a raw catalog entry. Total: unmapped or blank input yields
/// `(Other, Uncategorized)`.
pub fn classify(vendor: CloudProvider, product_family: &str, service: &str) -> Classification {
    if vendor == CloudProvider::Azure {
        if let Some(sub_category) = azure_database_override(service) {
            return Classification::of(sub_category);
        }
    }

    if product_family.trim().is_empty() || service.trim().is_empty() {
        return Classification::UNCATEGORIZED;
    }

    table(vendor)
        .lookup(product_family, service)
        .map(Classification::of)
        .unwrap_or(Classification::UNCATEGORIZED)
}
