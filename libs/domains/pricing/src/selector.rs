//! Pick the cheapest qualifying resource per (provider, kind, tier) and cost it.
//!
//! Selection is stable: among equally priced candidates the one seen first in
//! the pool wins, so repeated runs over an unchanged catalog agree exactly.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CloudProvider, ResourceFamily, SubCategory};
use crate::price::{HOURS_PER_MONTH, PriceKind};
use crate::resource::CanonicalResource;
use crate::usage::{TierSpec, UsageProfile, UsageTier};
use tracing::warn;

/// How candidates of a kind are filtered and ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// vCPU / memory minimums, positive hourly price, cheapest hourly
    Sizing(TierSpec),
    /// First reference entry for the provider
    Reference,
    /// Cheapest by the first populated field of a preference list; candidates
    /// with none of the listed fields are skipped
    Scored(&'static [PriceKind]),
    /// Positive hourly price, cheapest hourly
    Generic,
}

/// Price fields scored for multi-dimension families, most preferred first.
pub fn price_preferences(family: ResourceFamily) -> &'static [PriceKind] {
    match family {
        ResourceFamily::CloudFunction => &[PriceKind::PerRequest, PriceKind::PerGbSecond],
        ResourceFamily::ApiGateway => &[PriceKind::PerRequest, PriceKind::Monthly],
        ResourceFamily::BlobStorage => &[PriceKind::PerGbMonth, PriceKind::PerRequest],
        ResourceFamily::BlockStorage => &[PriceKind::PerGbMonth, PriceKind::PerIops, PriceKind::Monthly],
        ResourceFamily::Kubernetes => &[PriceKind::Hourly, PriceKind::Monthly],
        _ => &[],
    }
}

impl SelectionPolicy {
    pub fn for_kind(kind: SubCategory, tier: UsageTier) -> Self {
        let family = kind.family();
        if let Some(spec) = tier.sizing(family) {
            return SelectionPolicy::Sizing(spec);
        }
        if family.is_reference_priced() {
            return SelectionPolicy::Reference;
        }
        match price_preferences(family) {
            [] => SelectionPolicy::Generic,
            preferences => SelectionPolicy::Scored(preferences),
        }
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// First populated preferred field, with its kind.
fn score(resource: &CanonicalResource, preferences: &[PriceKind]) -> Option<(PriceKind, Decimal)> {
    preferences
        .iter()
        .find_map(|&kind| resource.prices.get(kind).map(|value| (kind, value)))
}

/// Choose a resource from `pool` for one provider and kind.
pub fn select<'a>(
    pool: &'a [CanonicalResource],
    provider: CloudProvider,
    kind: SubCategory,
    policy: SelectionPolicy,
) -> Option<&'a CanonicalResource> {
    let mut candidates = pool
        .iter()
        .filter(move |r| r.cloud == provider && r.sub_category == kind);

    match policy {
        SelectionPolicy::Sizing(spec) => candidates
            .filter(|r| r.vcpu.unwrap_or(0) >= spec.min_cpu)
            .filter(|r| r.memory_gb() >= spec.min_memory_gb)
            .filter_map(|r| positive(r.prices.price_per_hour).map(|hourly| (r, hourly)))
            .min_by_key(|(_, hourly)| *hourly)
            .map(|(r, _)| r),
        SelectionPolicy::Reference => candidates.next(),
        SelectionPolicy::Scored(preferences) => candidates
            .filter_map(|r| score(r, preferences).map(|(_, value)| (r, value)))
            .min_by_key(|(_, value)| *value)
            .map(|(r, _)| r),
        SelectionPolicy::Generic => candidates
            .filter_map(|r| positive(r.prices.price_per_hour).map(|hourly| (r, hourly)))
            .min_by_key(|(_, hourly)| *hourly)
            .map(|(r, _)| r),
    }
}

/// Monthly-equivalent cost of a selected resource under a policy.
/// `None` when the resource carries no usable price field or the product
/// overflows.
pub fn monthly_cost(
    resource: &CanonicalResource,
    policy: SelectionPolicy,
    profile: &UsageProfile,
) -> Option<Decimal> {
    match policy {
        SelectionPolicy::Sizing(_) | SelectionPolicy::Generic => resource
            .prices
            .price_per_hour
            .and_then(|hourly| hourly.checked_mul(HOURS_PER_MONTH)),
        SelectionPolicy::Reference => resource.prices.price_per_month,
        SelectionPolicy::Scored(preferences) => {
            let (kind, value) = score(resource, preferences)?;
            value.checked_mul(profile.quantity(kind))
        }
    }
}

/// Outcome of selection for one (provider, kind, tier)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSelection<'a> {
    pub resource: Option<&'a CanonicalResource>,
    /// Zero when nothing matched
    pub cost: Decimal,
}

impl<'a> ResourceSelection<'a> {
    pub const NO_MATCH: ResourceSelection<'static> = ResourceSelection {
        resource: None,
        cost: Decimal::ZERO,
    };

    /// Select and cost in one step. A candidate that cannot be costed is a
    /// no match, never a free one.
    pub fn resolve(
        pool: &'a [CanonicalResource],
        provider: CloudProvider,
        kind: SubCategory,
        tier: UsageTier,
    ) -> Self {
        let policy = SelectionPolicy::for_kind(kind, tier);
        let Some(resource) = select(pool, provider, kind, policy) else {
            return ResourceSelection::NO_MATCH;
        };

        match monthly_cost(resource, policy, tier.profile()) {
            Some(cost) => ResourceSelection {
                resource: Some(resource),
                cost,
            },
            None => {
                warn!(%provider, %kind, name = %resource.name, "selected resource has no costable price");
                ResourceSelection::NO_MATCH
            }
        }
    }

    pub fn is_match(&self) -> bool {
        self.resource.is_some()
    }
}
