//! Synthetic reference pools for load balancers and monitoring.
//!
//! These are not derived from the catalog: each provider has exactly one flat
//! monthly price per usage tier.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{CloudProvider, ResourceFamily, SubCategory};
use crate::price::PriceSheet;
use crate::resource::{CanonicalResource, ResourceDetails};
use crate::usage::UsageTier;

const REFERENCE_REGION: &str = "global";

struct ReferenceRow {
    provider: CloudProvider,
    name: &'static str,
    /// Monthly price per tier, Small..ExtraLarge
    monthly: [Decimal; 4],
}

const LOAD_BALANCERS: [ReferenceRow; 3] = [
    ReferenceRow {
        provider: CloudProvider::Aws,
        name: "Application Load Balancer",
        monthly: [dec!(16.51), dec!(22.27), dec!(38.69), dec!(73.00)],
    },
    ReferenceRow {
        provider: CloudProvider::Azure,
        name: "Standard Load Balancer",
        monthly: [dec!(0), dec!(18.25), dec!(36.50), dec!(73.00)],
    },
    ReferenceRow {
        provider: CloudProvider::Gcp,
        name: "Cloud Load Balancing",
        monthly: [dec!(18.41), dec!(18.41), dec!(36.82), dec!(73.64)],
    },
];

const MONITORING: [ReferenceRow; 3] = [
    ReferenceRow {
        provider: CloudProvider::Aws,
        name: "CloudWatch",
        monthly: [dec!(3.00), dec!(15.00), dec!(60.00), dec!(300.00)],
    },
    ReferenceRow {
        provider: CloudProvider::Azure,
        name: "Azure Monitor",
        monthly: [dec!(2.58), dec!(12.90), dec!(51.60), dec!(258.00)],
    },
    ReferenceRow {
        provider: CloudProvider::Gcp,
        name: "Cloud Monitoring",
        monthly: [dec!(0), dec!(7.68), dec!(38.40), dec!(192.00)],
    },
];

fn build(row: &ReferenceRow, sub_category: SubCategory, tier: UsageTier) -> CanonicalResource {
    let details = match sub_category.family() {
        ResourceFamily::LoadBalancer => ResourceDetails::LoadBalancer {
            load_balancer_type: Some(row.name.to_string()),
        },
        _ => ResourceDetails::Monitoring {
            plan: Some(tier.to_string()),
        },
    };

    CanonicalResource {
        cloud: row.provider,
        category: sub_category.category(),
        sub_category,
        region: REFERENCE_REGION.to_string(),
        name: row.name.to_string(),
        vcpu: None,
        memory: None,
        prices: PriceSheet {
            price_per_month: Some(row.monthly[tier.index()]),
            ..PriceSheet::default()
        },
        details,
    }
}

/// Reference resources for a subcategory at a tier, one per provider in
/// provider order. Empty for subcategories that are priced from the catalog.
pub fn reference_resources(sub_category: SubCategory, tier: UsageTier) -> Vec<CanonicalResource> {
    let rows: &[ReferenceRow] = match sub_category {
        SubCategory::LoadBalancer => &LOAD_BALANCERS,
        SubCategory::Monitoring => &MONITORING,
        _ => return Vec::new(),
    };
    rows.iter().map(|row| build(row, sub_category, tier)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn monthly(resources: &[CanonicalResource]) -> Vec<(CloudProvider, Decimal)> {
        resources
            .iter()
            .map(|r| (r.cloud, r.prices.price_per_month.unwrap()))
            .collect()
    }

    #[test]
    fn test_small_load_balancer_prices() {
        let pool = reference_resources(SubCategory::LoadBalancer, UsageTier::Small);
        assert_eq!(
            monthly(&pool),
            vec![
                (CloudProvider::Aws, dec!(16.51)),
                (CloudProvider::Azure, dec!(0)),
                (CloudProvider::Gcp, dec!(18.41)),
            ]
        );
        assert!(pool.iter().all(|r| r.prices.price_per_hour.is_none()));
    }

    #[test]
    fn test_one_entry_per_provider_per_tier() {
        for tier in UsageTier::iter() {
            for sub in [SubCategory::LoadBalancer, SubCategory::Monitoring] {
                let providers: Vec<CloudProvider> =
                    reference_resources(sub, tier).iter().map(|r| r.cloud).collect();
                assert_eq!(providers, CloudProvider::ALL.to_vec());
            }
        }
    }

    #[test]
    fn test_reference_prices_do_not_shrink_with_tier() {
        for rows in [&LOAD_BALANCERS, &MONITORING] {
            for row in rows.iter() {
                assert!(row.monthly.windows(2).all(|w| w[0] <= w[1]), "{}", row.name);
            }
        }
    }

    #[test]
    fn test_catalog_priced_kinds_have_no_reference() {
        assert!(reference_resources(SubCategory::VirtualMachines, UsageTier::Small).is_empty());
        assert_eq!(
            reference_resources(SubCategory::Monitoring, UsageTier::Large)[0].details,
            ResourceDetails::Monitoring {
                plan: Some("large".to_string())
            }
        );
    }
}
