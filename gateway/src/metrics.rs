//! Gateway metrics and the Prometheus recorder.
//!
//! | Metric | Kind | Labels |
//! |---|---|---|
//! | `regaccess_updates_total` | counter | `intent`, `outcome` |
//! | `regaccess_update_duration_seconds` | histogram | `intent` |
//! | `regaccess_ticket_image_updates_total` | counter | `outcome` |
//! | `regaccess_enrollments_total` | counter | `outcome` |
//! | `regaccess_signing_lookup_failures_total` | counter | |

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Outcome label of a successful operation
pub const OUTCOME_OK: &str = "ok";

/// Registers the descriptions of every gateway metric.
pub fn register_gateway_metrics() {
    describe_counter!(
        "regaccess_updates_total",
        "Registration & access updates by intent and outcome"
    );
    describe_histogram!(
        "regaccess_update_duration_seconds",
        "Time to process an update, signing lookup to write"
    );
    describe_counter!(
        "regaccess_ticket_image_updates_total",
        "Ticket image updates by outcome"
    );
    describe_counter!(
        "regaccess_enrollments_total",
        "Scrollpass membership enrollments by outcome"
    );
    describe_counter!(
        "regaccess_signing_lookup_failures_total",
        "Failed signing material lookups"
    );
}

/// Installs the global Prometheus recorder and registers metric descriptions.
///
/// # Errors
///
/// Returns the exporter error if bucket configuration or installation fails
/// (for example when a recorder is already installed).
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()?;
    register_gateway_metrics();
    Ok(handle)
}
