//! Prometheus metrics for the claimer.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the claimer.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Resolution metrics
        describe_counter!(
            "claimer_resolutions_total",
            "Total number of withdrawal resolution attempts"
        );
        describe_counter!(
            "claimer_resolutions_success_total",
            "Total number of successful withdrawal resolutions"
        );
        describe_counter!(
            "claimer_resolutions_failure_total",
            "Total failed withdrawal resolutions by error kind"
        );
        describe_histogram!(
            "claimer_resolution_duration_seconds",
            "Duration of each resolution attempt in seconds"
        );

        // Finalization metrics
        describe_counter!(
            "claimer_withdrawals_finalized_total",
            "Total number of withdrawals finalized on L1"
        );
    }

    /// Record a successful resolution attempt.
    pub fn record_resolution_success(&self, duration: Duration) {
        counter!("claimer_resolutions_total").increment(1);
        counter!("claimer_resolutions_success_total").increment(1);
        histogram!("claimer_resolution_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed resolution attempt.
    pub fn record_resolution_failure(&self, kind: &'static str, duration: Duration) {
        counter!("claimer_resolutions_total").increment(1);
        counter!("claimer_resolutions_failure_total", "kind" => kind).increment(1);
        histogram!("claimer_resolution_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a withdrawal finalized.
    pub fn record_withdrawal_finalized(&self) {
        counter!("claimer_withdrawals_finalized_total").increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
