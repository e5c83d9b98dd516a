//! Raw (amount, unit) prices -> canonical price fields.
//!
//! Each usable price line is matched against [`PRICE_RULES`] in order and
//! lands in exactly one canonical field. The table is the priority order: a
//! description trigger (snapshot, firewall rule, egress) sits directly ahead of
//! the generic unit rule it refines. When two lines claim the same field the
//! first one seen is kept.
//!
//! Absent means unknown; zero means free. The two are never merged.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::trace;

use crate::models::{RawPrice, ResourceFamily, SubCategory};

/// Average hours per month used for every hourly <-> monthly conversion.
pub const HOURS_PER_MONTH: Decimal = dec!(730);

const HOURS_PER_DAY: Decimal = dec!(24);

/// Purchase options treated as on-demand. Anything else (reserved, spot,
/// savings plans) is skipped.
const ON_DEMAND_OPTIONS: &[&str] = &["ondemand", "on_demand", "on-demand", "consumption"];

/// Canonical price dimension
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriceKind {
    Hourly,
    Monthly,
    PerRequest,
    PerGbMonth,
    PerGbSecond,
    PerIops,
    PerRule,
    PerGbOut,
    PerSnapshot,
}

/// Canonical price fields of a resource. `None` = unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSheet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_month: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_request: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_gb_month: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_gb_second: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_iops: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_rule: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_gb_out: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_snapshot: Option<Decimal>,
}

impl PriceSheet {
    pub fn get(&self, kind: PriceKind) -> Option<Decimal> {
        *self.slot(kind)
    }

    fn slot(&self, kind: PriceKind) -> &Option<Decimal> {
        match kind {
            PriceKind::Hourly => &self.price_per_hour,
            PriceKind::Monthly => &self.price_per_month,
            PriceKind::PerRequest => &self.price_per_request,
            PriceKind::PerGbMonth => &self.price_per_gb_month,
            PriceKind::PerGbSecond => &self.price_per_gb_second,
            PriceKind::PerIops => &self.price_per_iops,
            PriceKind::PerRule => &self.price_per_rule,
            PriceKind::PerGbOut => &self.price_per_gb_out,
            PriceKind::PerSnapshot => &self.price_per_snapshot,
        }
    }

    fn slot_mut(&mut self, kind: PriceKind) -> &mut Option<Decimal> {
        match kind {
            PriceKind::Hourly => &mut self.price_per_hour,
            PriceKind::Monthly => &mut self.price_per_month,
            PriceKind::PerRequest => &mut self.price_per_request,
            PriceKind::PerGbMonth => &mut self.price_per_gb_month,
            PriceKind::PerGbSecond => &mut self.price_per_gb_second,
            PriceKind::PerIops => &mut self.price_per_iops,
            PriceKind::PerRule => &mut self.price_per_rule,
            PriceKind::PerGbOut => &mut self.price_per_gb_out,
            PriceKind::PerSnapshot => &mut self.price_per_snapshot,
        }
    }

    /// Set a field unless it is already known. Returns whether it was set.
    pub fn set_if_absent(&mut self, kind: PriceKind, value: Decimal) -> bool {
        let slot = self.slot_mut(kind);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Builder-style setter that overwrites.
    pub fn with(mut self, kind: PriceKind, value: Decimal) -> Self {
        *self.slot_mut(kind) = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == PriceSheet::default()
    }
}

/// Amount conversion applied when a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    /// per-day -> per-hour (/24)
    DailyToHourly,
}

impl Conversion {
    pub fn apply(self, amount: Decimal) -> Option<Decimal> {
        match self {
            Conversion::Identity => Some(amount),
            Conversion::DailyToHourly => amount.checked_div(HOURS_PER_DAY),
        }
    }
}

/// One row of the unit dispatch table. All tokens are lowercase and matched
/// as substrings. Empty lists impose no requirement.
#[derive(Debug)]
pub struct PriceRule {
    pub name: &'static str,
    pub unit_any: &'static [&'static str],
    pub unit_none: &'static [&'static str],
    pub description_any: &'static [&'static str],
    pub sub_category_any: &'static [SubCategory],
    pub family_any: &'static [ResourceFamily],
    pub target: PriceKind,
    pub conversion: Conversion,
}

impl PriceRule {
    const fn new(name: &'static str, target: PriceKind) -> Self {
        Self {
            name,
            unit_any: &[],
            unit_none: &[],
            description_any: &[],
            sub_category_any: &[],
            family_any: &[],
            target,
            conversion: Conversion::Identity,
        }
    }

    fn matches(&self, line: &PriceLine) -> bool {
        let contains_any = |haystack: &str, needles: &[&str]| {
            needles.is_empty() || needles.iter().any(|n| haystack.contains(n))
        };
        contains_any(&line.unit, self.unit_any)
            && !self.unit_none.iter().any(|n| line.unit.contains(n))
            && contains_any(&line.description, self.description_any)
            && (self.sub_category_any.is_empty() || self.sub_category_any.contains(&line.sub_category))
            && (self.family_any.is_empty() || self.family_any.contains(&line.sub_category.family()))
    }
}

const GB_UNITS: &[&str] = &["gb"];
const MONTH_UNITS: &[&str] = &["month", "-mo"];
const METERED_UNITS: &[&str] = &[
    "quer", "key", "event", "request", "message", "operation", "call", "gb", "iops", "month",
    "second", "minute",
];

/// Ordered dispatch table; first match wins.
pub const PRICE_RULES: &[PriceRule] = &[
    PriceRule {
        unit_any: &["day"],
        conversion: Conversion::DailyToHourly,
        ..PriceRule::new("daily", PriceKind::Hourly)
    },
    PriceRule {
        unit_any: &["hour", "hrs"],
        ..PriceRule::new("hourly", PriceKind::Hourly)
    },
    PriceRule {
        unit_any: &["request"],
        ..PriceRule::new("per_request", PriceKind::PerRequest)
    },
    PriceRule {
        unit_any: &["gb-s", "gbs", "gb second"],
        ..PriceRule::new("gb_second", PriceKind::PerGbSecond)
    },
    PriceRule {
        unit_any: &["iops"],
        ..PriceRule::new("iops", PriceKind::PerIops)
    },
    PriceRule {
        unit_any: MONTH_UNITS,
        unit_none: GB_UNITS,
        description_any: &["rule", "policy", "policies"],
        ..PriceRule::new("firewall_rule", PriceKind::PerRule)
    },
    PriceRule {
        unit_any: MONTH_UNITS,
        unit_none: GB_UNITS,
        ..PriceRule::new("monthly", PriceKind::Monthly)
    },
    PriceRule {
        unit_any: GB_UNITS,
        description_any: &["snapshot", "backup"],
        ..PriceRule::new("snapshot", PriceKind::PerSnapshot)
    },
    PriceRule {
        unit_any: GB_UNITS,
        sub_category_any: &[SubCategory::DataTransfer, SubCategory::Cdn],
        ..PriceRule::new("egress_service", PriceKind::PerGbOut)
    },
    PriceRule {
        unit_any: GB_UNITS,
        description_any: &["data transfer", "egress", "outbound"],
        ..PriceRule::new("egress_description", PriceKind::PerGbOut)
    },
    PriceRule {
        unit_any: GB_UNITS,
        ..PriceRule::new("gb_month", PriceKind::PerGbMonth)
    },
    // Blank or time-like units only; metered units nothing above claims
    // ("Queries", "Keys", "Events") stay unpriced.
    PriceRule {
        unit_none: METERED_UNITS,
        family_any: &[
            ResourceFamily::ComputeInstance,
            ResourceFamily::Database,
            ResourceFamily::Kubernetes,
            ResourceFamily::Generic,
        ],
        ..PriceRule::new("hourly_default", PriceKind::Hourly)
    },
];

/// Normalized view of one price line used for rule matching
#[derive(Debug)]
pub struct PriceLine {
    unit: String,
    description: String,
    sub_category: SubCategory,
}

impl PriceLine {
    pub fn new(unit: &str, description: Option<&str>, sub_category: SubCategory) -> Self {
        Self {
            unit: unit.to_lowercase(),
            description: description.unwrap_or_default().to_lowercase(),
            sub_category,
        }
    }
}

/// First rule matching a price line.
pub fn match_rule(line: &PriceLine) -> Option<&'static PriceRule> {
    PRICE_RULES.iter().find(|rule| rule.matches(line))
}

fn is_on_demand(price: &RawPrice) -> bool {
    match price.purchase_option.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(option) => ON_DEMAND_OPTIONS.contains(&option.to_lowercase().as_str()),
    }
}

/// Fold a resource's raw prices into canonical fields.
pub fn normalize_prices(
    prices: &[RawPrice],
    description: Option<&str>,
    sub_category: SubCategory,
) -> PriceSheet {
    let mut sheet = PriceSheet::default();

    for raw in prices {
        if raw.amount.is_sign_negative() || !is_on_demand(raw) {
            trace!(unit = %raw.unit, option = ?raw.purchase_option, "skipping price line");
            continue;
        }

        let line = PriceLine::new(&raw.unit, description, sub_category);
        let Some(rule) = match_rule(&line) else {
            trace!(unit = %raw.unit, %sub_category, "no price rule matched");
            continue;
        };

        if let Some(value) = rule.conversion.apply(raw.amount) {
            sheet.set_if_absent(rule.target, value);
        }
    }

    if sheet.price_per_month.is_none() {
        sheet.price_per_month = sheet
            .price_per_hour
            .and_then(|hourly| hourly.checked_mul(HOURS_PER_MONTH));
    }

    sheet
}
