//! Prometheus metrics recorder and `/metrics` endpoint support.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render the `/metrics` endpoint, or `None`
/// when a recorder is already installed (tests, embedded use).
#[must_use]
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("prometheus metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "metrics recorder not installed");
            None
        }
    }
}

// Metric name constants for the HTTP layer (engine metrics live with the
// executor).

/// HTTP requests total (counter, labels: route).
pub const HTTP_REQUESTS_TOTAL: &str = "scribe_http_requests_total";
/// HTTP error responses total (counter, labels: route, code).
pub const HTTP_ERRORS_TOTAL: &str = "scribe_http_errors_total";
