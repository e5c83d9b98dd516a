use crate::{ConfigError, Environment, FromEnv, env_or_default};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::ParseError {
                key: "LOG_FORMAT".to_string(),
                details: format!("unknown log format '{other}'"),
            }),
        }
    }
}

/// Tracing settings.
///
/// - `APP_ENV`: "production" selects JSON output and a quiet default filter
/// - `LOG_FORMAT`: json | pretty | compact, overrides the environment default
/// - `RUST_LOG`: overrides the default filter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: Environment,
    pub format: LogFormat,
    pub default_filter: String,
}

impl TracingConfig {
    pub fn for_environment(environment: Environment) -> Self {
        if environment.is_production() {
            Self {
                environment,
                format: LogFormat::Json,
                default_filter: "warn".to_string(),
            }
        } else {
            Self {
                environment,
                format: LogFormat::Pretty,
                default_filter: "info".to_string(),
            }
        }
    }
}

impl FromEnv for TracingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::for_environment(Environment::from_env());
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        config.default_filter = env_or_default("LOG_FILTER", &config.default_filter);
        Ok(config)
    }
}

/// Initialize tracing with error span capture.
///
/// Events go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` wins over `config.default_filter`. Safe to call multiple times;
/// later calls are no-ops.
pub fn init_tracing(config: &TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    match result {
        Ok(_) => info!(environment = ?config.environment, format = ?config.format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_environment() {
        let dev = TracingConfig::for_environment(Environment::Development);
        assert_eq!(dev.format, LogFormat::Pretty);
        assert_eq!(dev.default_filter, "info");

        let prod = TracingConfig::for_environment(Environment::Production);
        assert_eq!(prod.format, LogFormat::Json);
        assert_eq!(prod.default_filter, "warn");
    }

    #[test]
    fn test_log_format_override() {
        temp_env::with_vars(
            [("APP_ENV", Some("production")), ("LOG_FORMAT", Some("compact"))],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.format, LogFormat::Compact);
            },
        );
    }

    #[test]
    fn test_unknown_log_format_is_an_error() {
        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            assert!(TracingConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        let config = TracingConfig::for_environment(Environment::Development);
        init_tracing(&config);
        init_tracing(&config);
    }

    #[test]
    fn test_init_tracing_with_rust_log_env() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            init_tracing(&TracingConfig::for_environment(Environment::Production));
        });
    }
}
