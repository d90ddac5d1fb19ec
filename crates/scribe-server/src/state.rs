//! Shared server state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use scribe_engine::JobExecutor;
use scribe_store::{ArtifactStore, JobStore};

/// State handed to every handler. Cheap to clone — all `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Job record store.
    pub store: Arc<JobStore>,
    /// Audio/transcript blob store.
    pub artifacts: Arc<ArtifactStore>,
    /// Background job executor.
    pub executor: Arc<JobExecutor>,
    /// Model used when a submission does not name one.
    pub default_model: String,
    /// Prometheus render handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Bundle the collaborators into a server state.
    #[must_use]
    pub fn new(
        store: Arc<JobStore>,
        artifacts: Arc<ArtifactStore>,
        executor: Arc<JobExecutor>,
        default_model: String,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            store,
            artifacts,
            executor,
            default_model,
            metrics,
        }
    }
}
