//! Health check and metrics export.

use axum::{extract::Extension, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};

/// `GET /health`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics` in Prometheus text format.
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}
