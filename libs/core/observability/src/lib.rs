//! Observability utilities for the cost comparison engine.
//!
//! This crate provides:
//! - Prometheus metrics recording and text exposition
//! - Cost-engine metrics (normalization, comparisons, rejected requests)
//! - A stage timer guard for duration histograms
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, CostMetrics, StageTimer};
//!
//! init_metrics()?;
//!
//! let timer = StageTimer::new("compare");
//! CostMetrics::record_comparison("aws", 55.01);
//! drop(timer);
//!
//! eprintln!("{}", render_metrics());
//! ```

pub mod cost;

pub use cost::{CostMetrics, StageTimer};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once and return its handle.
///
/// Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Prometheus text exposition of everything recorded so far
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    describe_counter!(
        "cost_engine_resources_normalized_total",
        "Catalog entries normalized into canonical resources"
    );
    describe_counter!(
        "cost_engine_uncategorized_total",
        "Catalog entries that fell back to other/uncategorized"
    );
    describe_counter!(
        "cost_engine_comparisons_total",
        "Provider cost comparisons computed"
    );
    describe_gauge!(
        "cost_engine_provider_total",
        "Monthly total of the last comparison by provider"
    );
    describe_counter!(
        "cost_engine_no_match_total",
        "Requested kinds with no qualifying resource by provider"
    );
    describe_counter!(
        "cost_engine_rejected_requests_total",
        "Requests rejected before evaluation by reason"
    );
    describe_histogram!(
        "cost_engine_stage_duration_seconds",
        "Duration of engine stages in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_and_renders_recorded_metrics() {
        let first = init_metrics().unwrap() as *const PrometheusHandle;
        let second = init_metrics().unwrap() as *const PrometheusHandle;
        assert_eq!(first, second);

        CostMetrics::record_rejected_request("unknown_resource_kind");
        let text = render_metrics();
        assert!(text.contains("cost_engine_rejected_requests_total"));
        assert!(text.contains("unknown_resource_kind"));
    }
}
