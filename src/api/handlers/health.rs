use crate::domain::ports::ReadinessProbe;
use axum::{http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 200 when the service's store answers, 503 otherwise.
pub async fn readiness(probe: Arc<dyn ReadinessProbe>) -> (StatusCode, Json<serde_json::Value>) {
    if probe.ready().await {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "error": "dependency_unavailable" })),
        )
    }
}
