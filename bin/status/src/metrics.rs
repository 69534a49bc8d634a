//! Prometheus metrics for `watch`.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;
use withdrawal::Status;

/// Aggregated withdrawal status metrics.
///
/// Descriptions are registered with the global metrics registry on creation.
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
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "withdrawal_resolutions_total",
            "Total number of resolutions by resulting state"
        );
        describe_counter!(
            "withdrawal_resolution_failures_total",
            "Total number of resolutions that failed before producing a status"
        );
        describe_histogram!(
            "withdrawal_resolution_duration_seconds",
            "Duration of each resolution in seconds"
        );

        describe_gauge!(
            "withdrawal_status",
            "1 for the current state of a withdrawal, 0 for the others"
        );
        describe_gauge!(
            "withdrawal_challenge_seconds_remaining",
            "Seconds until the challenge period ends"
        );
        describe_gauge!(
            "withdrawal_finalization_gas",
            "Estimated gas of the finalization call once ready"
        );
    }

    /// Record a resolution that produced `status`.
    pub fn record_resolution(&self, tx: &str, status: &Status, duration: Duration) {
        counter!("withdrawal_resolutions_total", "state" => status.label()).increment(1);
        histogram!("withdrawal_resolution_duration_seconds").record(duration.as_secs_f64());

        for state in ["NOT_SENT", "IN_CHALLENGE", "READY", "EXECUTED", "ERROR"] {
            let value = if state == status.label() { 1.0 } else { 0.0 };
            gauge!("withdrawal_status", "tx" => tx.to_string(), "state" => state).set(value);
        }

        let remaining = match status {
            Status::InChallenge { seconds_remaining } => *seconds_remaining as f64,
            _ => 0.0,
        };
        gauge!("withdrawal_challenge_seconds_remaining", "tx" => tx.to_string()).set(remaining);

        if let Status::Ready { gas } = status {
            gauge!("withdrawal_finalization_gas", "tx" => tx.to_string()).set(*gas as f64);
        }
    }

    /// Record a resolution that failed with an RPC or decoding error.
    pub fn record_failure(&self, duration: Duration) {
        counter!("withdrawal_resolution_failures_total").increment(1);
        histogram!("withdrawal_resolution_duration_seconds").record(duration.as_secs_f64());
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
