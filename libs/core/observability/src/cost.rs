//! Cost-engine metrics.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Cost engine metrics recorder
pub struct CostMetrics;

impl CostMetrics {
    /// Record one catalog normalization pass
    pub fn record_normalization(resources: usize, uncategorized: usize) {
        counter!("cost_engine_resources_normalized_total").increment(resources as u64);
        counter!("cost_engine_uncategorized_total").increment(uncategorized as u64);

        tracing::debug!(resources, uncategorized, "Normalized catalog");
    }

    /// Record a provider total from a comparison
    pub fn record_comparison(provider: &str, total: f64) {
        counter!("cost_engine_comparisons_total", "provider" => provider.to_string()).increment(1);
        gauge!("cost_engine_provider_total", "provider" => provider.to_string()).set(total);
    }

    /// Record a requested kind that matched nothing for a provider
    pub fn record_no_match(provider: &str, kind: &str) {
        counter!(
            "cost_engine_no_match_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    /// Record a request rejected before evaluation
    pub fn record_rejected_request(reason: &str) {
        counter!("cost_engine_rejected_requests_total", "reason" => reason.to_string()).increment(1);

        tracing::warn!(reason, "Rejected request");
    }
}

/// Timer guard for stage durations.
///
/// Records `cost_engine_stage_duration_seconds` when `stop()` is called or
/// when dropped.
pub struct StageTimer {
    start: Instant,
    stage: String,
    stopped: bool,
}

impl StageTimer {
    pub fn new(stage: &str) -> Self {
        Self {
            start: Instant::now(),
            stage: stage.to_string(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns duration in milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("cost_engine_stage_duration_seconds", "stage" => self.stage.clone())
            .record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_records_once() {
        let mut timer = StageTimer::new("normalize");
        timer.stop();
        assert_eq!(timer.stop(), 0);
    }

    #[test]
    fn test_recording_without_recorder_is_a_noop() {
        CostMetrics::record_normalization(10, 2);
        CostMetrics::record_comparison("aws", 36.5);
        CostMetrics::record_no_match("gcp", "virtual_machines");
        let _timer = StageTimer::new("compare");
    }
}
