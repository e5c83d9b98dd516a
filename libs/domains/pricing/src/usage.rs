//! Usage tiers, their sizing minimums and their metered quantities.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::error::PricingError;
use crate::models::ResourceFamily;
use crate::price::{HOURS_PER_MONTH, PriceKind};

/// Workload size used to pick and cost resources
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum UsageTier {
    #[default]
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl FromStr for UsageTier {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "small" | "s" => Ok(UsageTier::Small),
            "medium" | "m" => Ok(UsageTier::Medium),
            "large" | "l" => Ok(UsageTier::Large),
            "extra_large" | "extralarge" | "xl" => Ok(UsageTier::ExtraLarge),
            _ => Err(PricingError::InvalidUsageTier(s.to_string())),
        }
    }
}

/// Minimum shape a sizing-sensitive resource must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierSpec {
    pub min_cpu: u32,
    pub min_memory_gb: Decimal,
}

impl TierSpec {
    const fn new(min_cpu: u32, min_memory_gb: Decimal) -> Self {
        Self {
            min_cpu,
            min_memory_gb,
        }
    }
}

/// Metered quantities per month for usage-priced resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageProfile {
    pub requests: Decimal,
    pub gb_seconds: Decimal,
    pub storage_gb: Decimal,
    pub egress_gb: Decimal,
    pub iops: Decimal,
    pub rules: Decimal,
    pub snapshot_gb: Decimal,
}

impl UsageProfile {
    /// Monthly quantity billed for one unit of the given price field.
    pub fn quantity(&self, kind: PriceKind) -> Decimal {
        match kind {
            PriceKind::Hourly => HOURS_PER_MONTH,
            PriceKind::Monthly => Decimal::ONE,
            PriceKind::PerRequest => self.requests,
            PriceKind::PerGbSecond => self.gb_seconds,
            PriceKind::PerGbMonth => self.storage_gb,
            PriceKind::PerGbOut => self.egress_gb,
            PriceKind::PerIops => self.iops,
            PriceKind::PerRule => self.rules,
            PriceKind::PerSnapshot => self.snapshot_gb,
        }
    }
}

const COMPUTE_SIZING: [TierSpec; 4] = [
    TierSpec::new(2, dec!(4)),
    TierSpec::new(4, dec!(8)),
    TierSpec::new(8, dec!(16)),
    TierSpec::new(16, dec!(32)),
];

const DATABASE_SIZING: [TierSpec; 4] = [
    TierSpec::new(1, dec!(2)),
    TierSpec::new(2, dec!(4)),
    TierSpec::new(4, dec!(16)),
    TierSpec::new(8, dec!(32)),
];

const PROFILES: [UsageProfile; 4] = [
    UsageProfile {
        requests: dec!(1000000),
        gb_seconds: dec!(400000),
        storage_gb: dec!(100),
        egress_gb: dec!(100),
        iops: dec!(3000),
        rules: dec!(10),
        snapshot_gb: dec!(50),
    },
    UsageProfile {
        requests: dec!(5000000),
        gb_seconds: dec!(2000000),
        storage_gb: dec!(500),
        egress_gb: dec!(500),
        iops: dec!(6000),
        rules: dec!(20),
        snapshot_gb: dec!(250),
    },
    UsageProfile {
        requests: dec!(20000000),
        gb_seconds: dec!(8000000),
        storage_gb: dec!(2000),
        egress_gb: dec!(2000),
        iops: dec!(16000),
        rules: dec!(50),
        snapshot_gb: dec!(1000),
    },
    UsageProfile {
        requests: dec!(100000000),
        gb_seconds: dec!(40000000),
        storage_gb: dec!(10000),
        egress_gb: dec!(10000),
        iops: dec!(64000),
        rules: dec!(100),
        snapshot_gb: dec!(5000),
    },
];

impl UsageTier {
    pub(crate) fn index(self) -> usize {
        match self {
            UsageTier::Small => 0,
            UsageTier::Medium => 1,
            UsageTier::Large => 2,
            UsageTier::ExtraLarge => 3,
        }
    }

    /// Sizing minimums for a sizing-sensitive family, `None` otherwise.
    pub fn sizing(self, family: ResourceFamily) -> Option<TierSpec> {
        match family {
            ResourceFamily::ComputeInstance => Some(COMPUTE_SIZING[self.index()]),
            ResourceFamily::Database => Some(DATABASE_SIZING[self.index()]),
            _ => None,
        }
    }

    pub fn profile(self) -> &'static UsageProfile {
        &PROFILES[self.index()]
    }
}

/// A tier whose minimums or quantities fall below the previous tier's
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{table} table is not monotonic at tier {tier}")]
pub struct NonMonotonicTier {
    pub table: &'static str,
    pub tier: UsageTier,
}

/// Check that sizing minimums and usage quantities never shrink as tiers grow.
pub fn verify_usage_tables() -> Result<(), NonMonotonicTier> {
    let tiers: Vec<UsageTier> = UsageTier::iter().collect();
    for pair in tiers.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);

        for (table, family) in [
            ("compute sizing", ResourceFamily::ComputeInstance),
            ("database sizing", ResourceFamily::Database),
        ] {
            if let (Some(a), Some(b)) = (lower.sizing(family), upper.sizing(family)) {
                if a.min_cpu > b.min_cpu || a.min_memory_gb > b.min_memory_gb {
                    return Err(NonMonotonicTier { table, tier: upper });
                }
            }
        }

        if PriceKind::iter().any(|kind| lower.profile().quantity(kind) > upper.profile().quantity(kind)) {
            return Err(NonMonotonicTier {
                table: "usage profile",
                tier: upper,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parsing() {
        assert_eq!("small".parse::<UsageTier>().unwrap(), UsageTier::Small);
        assert_eq!("Medium".parse::<UsageTier>().unwrap(), UsageTier::Medium);
        assert_eq!("extra-large".parse::<UsageTier>().unwrap(), UsageTier::ExtraLarge);
        assert_eq!("XL".parse::<UsageTier>().unwrap(), UsageTier::ExtraLarge);

        let err = "huge".parse::<UsageTier>().unwrap_err();
        assert!(matches!(err, PricingError::InvalidUsageTier(ref t) if t == "huge"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for tier in UsageTier::iter() {
            assert_eq!(tier.to_string().parse::<UsageTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_sizing_is_monotonic() {
        for family in [ResourceFamily::ComputeInstance, ResourceFamily::Database] {
            let specs: Vec<TierSpec> = UsageTier::iter().filter_map(|t| t.sizing(family)).collect();
            assert_eq!(specs.len(), 4);
            for pair in specs.windows(2) {
                assert!(pair[0].min_cpu <= pair[1].min_cpu, "{family}: {pair:?}");
                assert!(pair[0].min_memory_gb <= pair[1].min_memory_gb, "{family}: {pair:?}");
            }
        }
    }

    #[test]
    fn test_usage_profiles_are_monotonic() {
        let profiles: Vec<&UsageProfile> = UsageTier::iter().map(UsageTier::profile).collect();
        for pair in profiles.windows(2) {
            for kind in PriceKind::iter() {
                assert!(pair[0].quantity(kind) <= pair[1].quantity(kind), "{kind}");
            }
        }
    }

    #[test]
    fn test_tables_verify() {
        assert_eq!(verify_usage_tables(), Ok(()));
    }

    #[test]
    fn test_non_sizing_families_have_no_minimums() {
        assert_eq!(UsageTier::Large.sizing(ResourceFamily::BlobStorage), None);
        assert_eq!(UsageTier::Large.sizing(ResourceFamily::LoadBalancer), None);
        assert_eq!(
            UsageTier::Small.sizing(ResourceFamily::ComputeInstance),
            Some(TierSpec::new(2, dec!(4)))
        );
    }

    #[test]
    fn test_flat_quantities() {
        let profile = UsageTier::Medium.profile();
        assert_eq!(profile.quantity(PriceKind::Hourly), dec!(730));
        assert_eq!(profile.quantity(PriceKind::Monthly), Decimal::ONE);
        assert_eq!(profile.quantity(PriceKind::PerRequest), dec!(5000000));
    }
}
