//! Prometheus export for the `metrics` facade.
//!
//! Services record through `metrics::counter!`/`histogram!`; this module owns
//! the global recorder and renders it for the `/metrics` endpoint.

use crate::error::AppError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it again after a successful
/// install is a no-op.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format, or `None` when no recorder
/// has been installed.
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}
