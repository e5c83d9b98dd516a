//! Configuration for the cost comparison CLI

use core_config::tracing::TracingConfig;
use core_config::{ConfigError, FromEnv, env_list, env_or_default, env_parse};
use std::path::PathBuf;

const DEFAULT_RESOURCES: &[&str] = &["virtual_machines", "relational", "load_balancer"];

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON catalog file used when `--catalog` is not given
    pub catalog_path: PathBuf,
    /// Usage tier used when `--usage` is not given
    pub default_usage: String,
    /// Resource kinds compared when `--resources` is not given
    pub default_resources: Vec<String>,
    /// Print the Prometheus exposition to stderr after a command
    pub metrics_enabled: bool,
    pub tracing: TracingConfig,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            catalog_path: PathBuf::from(env_or_default("CATALOG_PATH", "catalog.json")),
            default_usage: env_or_default("DEFAULT_USAGE_TIER", "small"),
            default_resources: env_list("DEFAULT_RESOURCES", DEFAULT_RESOURCES),
            metrics_enabled: env_parse("METRICS_ENABLED", false)?,
            tracing: TracingConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 6] = [
        "CATALOG_PATH",
        "DEFAULT_USAGE_TIER",
        "DEFAULT_RESOURCES",
        "METRICS_ENABLED",
        "APP_ENV",
        "LOG_FORMAT",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(KEYS, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.catalog_path, PathBuf::from("catalog.json"));
            assert_eq!(config.default_usage, "small");
            assert_eq!(
                config.default_resources,
                vec!["virtual_machines", "relational", "load_balancer"]
            );
            assert!(!config.metrics_enabled);
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("CATALOG_PATH", Some("/data/prices.json")),
                ("DEFAULT_USAGE_TIER", Some("large")),
                ("DEFAULT_RESOURCES", Some("serverless_functions, blob_storage")),
                ("METRICS_ENABLED", Some("true")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.catalog_path, PathBuf::from("/data/prices.json"));
                assert_eq!(config.default_usage, "large");
                assert_eq!(config.default_resources, vec!["serverless_functions", "blob_storage"]);
                assert!(config.metrics_enabled);
            },
        );
    }

    #[test]
    fn test_invalid_metrics_flag_is_an_error() {
        temp_env::with_var("METRICS_ENABLED", Some("sometimes"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
