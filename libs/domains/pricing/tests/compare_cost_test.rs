//! Cost comparison tests for the pricing domain
//!
//! These run the public engine end to end over small literal catalogs:
//! classification, extraction, price normalization, selection and totals.

use domain_pricing::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;

fn aws_vm(name: &str, vcpu: u32, memory: &str, hourly: Decimal) -> RawCatalogEntry {
    RawCatalogEntry::new(CloudProvider::Aws, "Compute Instance", "AmazonEC2", "us-east-1")
        .with_attribute("instanceType", name)
        .with_attribute("vcpu", vcpu.to_string())
        .with_attribute("memory", memory)
        .with_price(RawPrice::new(hourly, "Hrs").with_purchase_option("OnDemand"))
}

fn aws_db(name: &str, vcpu: u32, memory: &str, hourly: Decimal) -> RawCatalogEntry {
    RawCatalogEntry::new(CloudProvider::Aws, "Database Instance", "AmazonRDS", "us-east-1")
        .with_attribute("instanceType", name)
        .with_attribute("vcpu", vcpu.to_string())
        .with_attribute("memory", memory)
        .with_attribute("databaseEngine", "PostgreSQL")
        .with_price(RawPrice::new(hourly, "Hrs"))
}

fn mixed_catalog() -> Vec<RawCatalogEntry> {
    vec![
        aws_vm("t3.medium", 2, "4 GiB", dec!(0.0416)),
        aws_vm("t3.xlarge", 4, "16 GiB", dec!(0.1664)),
        aws_vm("m5.2xlarge", 8, "32 GiB", dec!(0.384)),
        aws_vm("m5.4xlarge", 16, "64 GiB", dec!(0.768)),
        RawCatalogEntry::new(CloudProvider::Azure, "Compute", "Virtual Machines", "eastus")
            .with_attribute("armSkuName", "Standard_B2s")
            .with_attribute("vCPUs", "2")
            .with_attribute("memoryInGB", "4")
            .with_price(RawPrice::new(dec!(0.0416), "1 Hour").with_purchase_option("Consumption"))
            .with_price(RawPrice::new(dec!(0.02), "1 Hour").with_purchase_option("Reservation")),
        RawCatalogEntry::new(CloudProvider::Gcp, "Compute", "Compute Engine", "us-central1")
            .with_attribute("machineType", "e2-standard-4")
            .with_attribute("description", "E2 Instance: 4 vCPU + 16GB RAM")
            .with_price(RawPrice::new(dec!(0.134), "h")),
        RawCatalogEntry::new(CloudProvider::Gcp, "Compute", "Compute Engine", "us-central1")
            .with_attribute("machineType", "n2-highmem-2")
            .with_price(RawPrice::new(dec!(0.131), "h")),
        aws_db("db.t3.micro", 2, "1 GiB", dec!(0.017)),
        aws_db("db.t3.small", 2, "2 GiB", dec!(0.034)),
        RawCatalogEntry::new(CloudProvider::Aws, "Serverless", "AWSLambda", "us-east-1")
            .with_attribute("group", "AWS-Lambda-Requests")
            .with_price(RawPrice::new(dec!(0.0000002), "Requests")),
        RawCatalogEntry::new(CloudProvider::Gcp, "Storage", "Cloud Storage", "us")
            .with_attribute("storageClass", "STANDARD")
            .with_price(RawPrice::new(dec!(0.020), "GB/Month")),
        RawCatalogEntry::new(CloudProvider::Azure, "Mystery Family", "Something New", "eastus")
            .with_price(RawPrice::new(dec!(1), "1 Hour")),
    ]
}

fn total(result: &CostComparisonResult, provider: CloudProvider) -> Decimal {
    result.provider(provider).unwrap().total
}

#[test]
fn test_single_instance_small_tier() {
    let catalog = vec![aws_vm("t2.medium", 2, "4 GB", dec!(0.05))];
    let result = compare_cost(&catalog, &[SubCategory::VirtualMachines], UsageTier::Small);

    let aws = result.provider(CloudProvider::Aws).unwrap();
    assert_eq!(aws.total, dec!(36.50));
    assert_eq!(aws.breakdown.len(), 1);
    assert_eq!(aws.breakdown[0].resource, SubCategory::VirtualMachines);
    assert_eq!(aws.breakdown[0].detail.as_ref().unwrap()["name"], "t2.medium");
}

#[test]
fn test_undersized_instance_is_no_match() {
    let catalog = vec![aws_vm("t2.medium", 2, "4 GB", dec!(0.05))];
    let result = compare_cost(&catalog, &[SubCategory::VirtualMachines], UsageTier::Medium);

    let aws = result.provider(CloudProvider::Aws).unwrap();
    assert_eq!(aws.total, Decimal::ZERO);
    assert_eq!(aws.breakdown[0].cost, Decimal::ZERO);
    assert!(aws.breakdown[0].detail.is_none());
}

#[test]
fn test_cheapest_qualifying_database() {
    let catalog = vec![
        aws_db("db.t3.medium", 2, "4 GB", dec!(0.068)),
        aws_db("db.t3.small", 1, "2 GB", dec!(0.034)),
    ];
    let result = compare_cost(&catalog, &[SubCategory::Relational], UsageTier::Small);

    let aws = result.provider(CloudProvider::Aws).unwrap();
    assert_eq!(aws.total, dec!(24.82));
    let detail = aws.breakdown[0].detail.as_ref().unwrap();
    assert_eq!(detail["name"], "db.t3.small");
    assert_eq!(detail["engine"], "PostgreSQL");
}

#[test]
fn test_load_balancer_reference_totals() {
    let result = compare_cost(&[], &[SubCategory::LoadBalancer], UsageTier::Small);

    assert_eq!(total(&result, CloudProvider::Aws), dec!(16.51));
    assert_eq!(total(&result, CloudProvider::Azure), dec!(0));
    assert_eq!(total(&result, CloudProvider::Gcp), dec!(18.41));
    for provider in &result.providers {
        assert_eq!(provider.breakdown.len(), 1);
        assert_eq!(provider.breakdown[0].resource, SubCategory::LoadBalancer);
    }
}

#[test]
fn test_empty_request() {
    let result = compare_cost(&mixed_catalog(), &[], UsageTier::Large);

    assert_eq!(result.providers.len(), 3);
    for provider in &result.providers {
        assert_eq!(provider.total, Decimal::ZERO);
        assert!(provider.breakdown.is_empty());
    }
}

#[test]
fn test_total_is_exact_sum_of_breakdown() {
    let kinds: Vec<SubCategory> = SubCategory::iter().collect();
    for tier in UsageTier::iter() {
        let result = compare_cost(&mixed_catalog(), &kinds, tier);
        for provider in &result.providers {
            let sum: Decimal = provider.breakdown.iter().map(|e| e.cost).sum();
            assert_eq!(provider.total, sum, "{} at {tier}", provider.provider);
            assert_eq!(provider.breakdown.len(), kinds.len());
        }
    }
}

#[test]
fn test_repeated_comparison_is_identical() {
    let kinds = [
        SubCategory::VirtualMachines,
        SubCategory::Relational,
        SubCategory::CloudFunctions,
        SubCategory::Monitoring,
    ];
    let first = compare_cost(&mixed_catalog(), &kinds, UsageTier::Medium);
    let second = compare_cost(&mixed_catalog(), &kinds, UsageTier::Medium);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_larger_tier_never_selects_cheaper_match() {
    let catalog = mixed_catalog();
    let tiers: Vec<UsageTier> = UsageTier::iter().collect();

    for kind in [SubCategory::VirtualMachines, SubCategory::Relational, SubCategory::CloudFunctions] {
        for provider in CloudProvider::ALL {
            let costs: Vec<Option<Decimal>> = tiers
                .iter()
                .map(|&tier| {
                    let result = compare_cost(&catalog, &[kind], tier);
                    let entry = &result.provider(provider).unwrap().breakdown[0];
                    entry.detail.as_ref().map(|_| entry.cost)
                })
                .collect();

            for pair in costs.windows(2) {
                if let [Some(smaller), Some(larger)] = pair {
                    assert!(larger >= smaller, "{provider} {kind}: {costs:?}");
                }
            }
        }
    }
}

#[test]
fn test_sizing_selection_never_has_free_hourly_price() {
    let mut catalog = mixed_catalog();
    catalog.insert(0, aws_vm("free-tier", 2, "4 GiB", Decimal::ZERO));

    let result = compare_cost(&catalog, &[SubCategory::VirtualMachines], UsageTier::Small);
    let detail = result.provider(CloudProvider::Aws).unwrap().breakdown[0]
        .detail
        .clone()
        .unwrap();
    assert_eq!(detail["name"], "t3.medium");
}

#[test]
fn test_vendor_heuristics_feed_selection() {
    let catalog = mixed_catalog();

    // GCP sizes come from the description and from the machine-type ratio.
    let small = compare_cost(&catalog, &[SubCategory::VirtualMachines], UsageTier::Small);
    let gcp = &small.provider(CloudProvider::Gcp).unwrap().breakdown[0];
    assert_eq!(gcp.detail.as_ref().unwrap()["name"], "n2-highmem-2");
    assert_eq!(gcp.detail.as_ref().unwrap()["memory"], "16 GB");
    assert_eq!(gcp.cost, dec!(95.63));

    let medium = compare_cost(&catalog, &[SubCategory::VirtualMachines], UsageTier::Medium);
    let gcp = &medium.provider(CloudProvider::Gcp).unwrap().breakdown[0];
    assert_eq!(gcp.detail.as_ref().unwrap()["vcpu"], 4);

    // Reserved Azure lines never undercut on-demand.
    assert_eq!(total(&small, CloudProvider::Azure), dec!(30.368));
}

#[test]
fn test_usage_priced_kinds() {
    let catalog = mixed_catalog();
    let result = compare_cost(
        &catalog,
        &[SubCategory::CloudFunctions, SubCategory::BlobStorage],
        UsageTier::Small,
    );

    let aws = result.provider(CloudProvider::Aws).unwrap();
    assert_eq!(aws.breakdown[0].cost, dec!(0.2));
    assert!(aws.breakdown[1].detail.is_none());

    let gcp = result.provider(CloudProvider::Gcp).unwrap();
    assert!(gcp.breakdown[0].detail.is_none());
    assert_eq!(gcp.breakdown[1].cost, dec!(2.0));
    assert_eq!(gcp.breakdown[1].detail.as_ref().unwrap()["storage_class"], "STANDARD");
}

#[test]
fn test_uncategorized_entries_remain_selectable() {
    let result = compare_cost(&mixed_catalog(), &[SubCategory::Uncategorized], UsageTier::Small);

    assert_eq!(total(&result, CloudProvider::Azure), dec!(730));
    assert_eq!(total(&result, CloudProvider::Aws), Decimal::ZERO);
}

#[test]
fn test_cheapest_provider() {
    let result = compare_cost(
        &mixed_catalog(),
        &[SubCategory::VirtualMachines, SubCategory::LoadBalancer],
        UsageTier::Small,
    );

    // AWS 30.368 + 16.51, Azure 30.368 + 0, GCP 95.63 + 18.41
    let cheapest = result.cheapest().unwrap();
    assert_eq!(cheapest.provider, CloudProvider::Azure);
    assert_eq!(cheapest.total, dec!(30.368));
    assert_eq!(result.usage, UsageTier::Small);
}

#[test]
fn test_per_disk_monthly_block_storage_is_not_free() {
    let catalog = vec![
        RawCatalogEntry::new(CloudProvider::Azure, "Storage", "Managed Disks", "eastus")
            .with_attribute("skuName", "P10 LRS")
            .with_price(RawPrice::new(dec!(19.71), "1/Month").with_purchase_option("Consumption")),
    ];
    let result = compare_cost(&catalog, &[SubCategory::BlockStorage], UsageTier::Small);

    let azure = result.provider(CloudProvider::Azure).unwrap();
    assert_eq!(azure.total, dec!(19.71));
    assert_eq!(azure.breakdown[0].detail.as_ref().unwrap()["name"], "P10 LRS");
}

#[test]
fn test_per_query_dns_price_is_not_treated_as_hourly() {
    let route53 = RawCatalogEntry::new(CloudProvider::Aws, "DNS Query", "AmazonRoute53", "global")
        .with_price(RawPrice::new(dec!(0.0000004), "Queries"));
    assert_eq!(normalize_entry(&route53).prices.price_per_hour, None);

    let result = compare_cost(&[route53], &[SubCategory::Dns], UsageTier::Small);
    let aws = result.provider(CloudProvider::Aws).unwrap();
    assert_eq!(aws.total, Decimal::ZERO);
    assert_eq!(aws.unmatched().collect::<Vec<_>>(), vec![SubCategory::Dns]);
}
