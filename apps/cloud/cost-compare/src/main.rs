//! Cost Compare
//!
//! Compares the monthly cost of a set of cloud resource kinds across AWS,
//! Azure and GCP, and browses the normalized catalog those totals come from.
//! Command output is JSON on stdout; logs and metrics go to stderr.

use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{
    CategoryInventory, CloudProvider, CompareCostRequest, CostComparisonResult, InventoryRequest,
    PricingError, PricingService, ResourceFamily, SubCategory, UsageTier, classifier,
    verify_rule_tables, verify_usage_tables,
};
use eyre::Result;
use observability::{CostMetrics, StageTimer};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

mod catalog;
mod config;

use catalog::JsonFileCatalog;
use config::Config;

#[derive(Parser)]
#[command(name = "cost-compare")]
#[command(about = "Compare monthly cloud costs across AWS, Azure and GCP")]
struct Cli {
    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare per-provider monthly totals for a set of resource kinds
    Compare {
        /// Resource kinds (virtual_machines, relational, load_balancer, ...). Defaults to configured kinds.
        #[arg(short, long, value_delimiter = ',')]
        resources: Option<Vec<String>>,

        /// Usage tier (small, medium, large, extra_large). Defaults to configured tier.
        #[arg(short, long)]
        usage: Option<String>,

        /// JSON catalog file. Defaults to CATALOG_PATH.
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(short, long)]
        pretty: bool,
    },

    /// List normalized resources grouped by category
    Inventory {
        /// Categories to include (compute, database, storage, ...). Defaults to all.
        #[arg(short = 'C', long, value_delimiter = ',')]
        categories: Option<Vec<String>>,

        /// Usage tier used for reference-priced entries
        #[arg(short, long)]
        usage: Option<String>,

        /// JSON catalog file. Defaults to CATALOG_PATH.
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show sizing minimums and usage quantities per tier
    Tiers,

    /// Check the classification rule tables for duplicates
    Rules,
}

#[derive(Serialize)]
struct TierView {
    tier: UsageTier,
    compute: Option<domain_pricing::TierSpec>,
    database: Option<domain_pricing::TierSpec>,
    usage: &'static domain_pricing::UsageProfile,
}

#[derive(Serialize)]
struct RuleTableView {
    vendor: CloudProvider,
    rules: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.tracing);

    let rules = verify_rule_tables()?;
    verify_usage_tables()?;
    debug!(rules, "Static tables verified");

    let cli = Cli::parse();
    let metrics_enabled = cli.metrics || config.metrics_enabled;
    if metrics_enabled {
        observability::init_metrics()?;
    }

    match cli.command {
        Commands::Compare {
            resources,
            usage,
            catalog,
            pretty,
        } => {
            let request = CompareCostRequest::new(
                resources.unwrap_or_else(|| config.default_resources.clone()),
                usage.unwrap_or_else(|| config.default_usage.clone()),
            );
            let service = service_for(catalog, &config);

            let timer = StageTimer::new("compare");
            let result = service.compare_cost(request).await.inspect_err(record_rejection)?;
            drop(timer);

            record_comparison(&result);
            info!(
                providers = result.providers.len(),
                kinds = result.requested.len(),
                "Comparison complete"
            );
            print_json(&result, pretty)?;
        }

        Commands::Inventory {
            categories,
            usage,
            catalog,
            pretty,
        } => {
            let request = InventoryRequest::new(
                categories.unwrap_or_default(),
                usage.unwrap_or_else(|| config.default_usage.clone()),
            );
            let service = service_for(catalog, &config);

            let timer = StageTimer::new("normalize");
            let groups = service.normalize(request).await.inspect_err(record_rejection)?;
            drop(timer);

            record_inventory(&groups);
            print_json(&groups, pretty)?;
        }

        Commands::Tiers => {
            let tiers: Vec<TierView> = UsageTier::iter()
                .map(|tier| TierView {
                    tier,
                    compute: tier.sizing(ResourceFamily::ComputeInstance),
                    database: tier.sizing(ResourceFamily::Database),
                    usage: tier.profile(),
                })
                .collect();
            print_json(&tiers, true)?;
        }

        Commands::Rules => {
            let tables: Vec<RuleTableView> = CloudProvider::ALL
                .into_iter()
                .map(|vendor| RuleTableView {
                    vendor,
                    rules: classifier::table(vendor).len(),
                })
                .collect();

            info!(total = rules, "Rule tables verified");
            print_json(&tables, true)?;
        }
    }

    if metrics_enabled {
        eprintln!("{}", observability::render_metrics());
    }

    Ok(())
}

fn service_for(catalog: Option<PathBuf>, config: &Config) -> PricingService<JsonFileCatalog> {
    let path = catalog.unwrap_or_else(|| config.catalog_path.clone());
    PricingService::new(JsonFileCatalog::new(path))
}

fn record_rejection(err: &PricingError) {
    if err.is_request_error() {
        CostMetrics::record_rejected_request(err.reason());
    }
}

fn record_comparison(result: &CostComparisonResult) {
    for provider in &result.providers {
        let name = provider.provider.to_string();
        CostMetrics::record_comparison(&name, provider.total.to_f64().unwrap_or_default());

        for kind in provider.unmatched() {
            warn!(provider = %name, kind = %kind, "No qualifying resource");
            CostMetrics::record_no_match(&name, &kind.to_string());
        }
    }
}

fn record_inventory(groups: &[CategoryInventory]) {
    let resources: usize = groups.iter().map(|g| g.resources.len()).sum();
    let uncategorized = groups
        .iter()
        .flat_map(|g| &g.resources)
        .filter(|r| r.sub_category == SubCategory::Uncategorized)
        .count();

    CostMetrics::record_normalization(resources, uncategorized);
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use domain_pricing::Catalog;
    use rust_decimal_macros::dec;

    fn fixture() -> JsonFileCatalog {
        JsonFileCatalog::new(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/catalog.json"))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compare_args_split_on_commas() {
        let cli = Cli::parse_from([
            "cost-compare",
            "compare",
            "--resources",
            "virtual_machines,relational",
            "--usage",
            "large",
            "--pretty",
        ]);

        match cli.command {
            Commands::Compare {
                resources,
                usage,
                catalog,
                pretty,
            } => {
                assert_eq!(resources.unwrap(), vec!["virtual_machines", "relational"]);
                assert_eq!(usage.as_deref(), Some("large"));
                assert!(catalog.is_none());
                assert!(pretty);
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_global_metrics_flag_after_subcommand() {
        let cli = Cli::parse_from(["cost-compare", "tiers", "--metrics"]);
        assert!(cli.metrics);
        assert!(matches!(cli.command, Commands::Tiers));
    }

    #[tokio::test]
    async fn test_compare_fixture_small() {
        let service = PricingService::new(fixture());
        let result = service
            .compare_cost(CompareCostRequest::new(
                ["virtual_machines", "relational", "load_balancer"],
                "small",
            ))
            .await
            .unwrap();

        // c5.large 0.085 * 730 + db.t3.small 0.034 * 730 + ALB small
        let aws = result.provider(CloudProvider::Aws).unwrap();
        assert_eq!(aws.total, dec!(62.05) + dec!(24.82) + dec!(16.51));

        // Standard_B2s 0.0416 * 730 + MySQL 2 vCore 0.1 * 730 + free LB tier
        let azure = result.provider(CloudProvider::Azure).unwrap();
        assert_eq!(azure.total, dec!(30.368) + dec!(73));

        assert!(result.providers.iter().all(|p| p.unmatched().next().is_none()));
    }

    #[tokio::test]
    async fn test_inventory_fixture_counts() {
        let entries = fixture().fetch_all().await.unwrap();
        let service = PricingService::new(fixture());
        let groups = service
            .normalize(InventoryRequest::new(["compute"], "small"))
            .await
            .unwrap();

        let compute = entries
            .iter()
            .filter(|e| {
                domain_pricing::classify(e.vendor, &e.product_family, &e.service).category
                    == domain_pricing::Category::Compute
            })
            .count();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].resources.len(), compute);
    }

    #[test]
    fn test_record_rejection_ignores_catalog_errors() {
        record_rejection(&PricingError::Catalog("disk".to_string()));
        record_rejection(&PricingError::InvalidUsageTier("huge".to_string()));
    }
}
