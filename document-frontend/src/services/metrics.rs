//! Metrics collection and Prometheus export.

use crate::models::NotificationKind;
use crate::services::backend::BackendOperation;
use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_upload() {
    counter!("documents_uploaded_total").increment(1);
}

pub fn record_delete() {
    counter!("documents_deleted_total").increment(1);
}

pub fn record_backend_error(operation: BackendOperation) {
    counter!("backend_errors_total", "operation" => operation.as_str()).increment(1);
}

pub fn record_notification(kind: NotificationKind) {
    counter!("notifications_enqueued_total", "kind" => kind.as_str()).increment(1);
}
