use crate::config::Config;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Path-prefixed reverse proxy in front of the four services. Internal
/// routes are deliberately unreachable: only the public prefixes are mapped.
pub struct GatewayState {
    client: reqwest::Client,
    tenant_url: String,
    user_url: String,
    resource_url: String,
    booking_url: String,
}

pub fn gateway_router(config: &Config) -> Router {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client");

    let state = Arc::new(GatewayState {
        client,
        tenant_url: config.tenant_service_url.clone(),
        user_url: config.user_service_url.clone(),
        resource_url: config.resource_service_url.clone(),
        booking_url: config.booking_service_url.clone(),
    });

    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .fallback(proxy)
        .with_state(state)
}

async fn proxy(State(state): State<Arc<GatewayState>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or("");

    let base = match first_segment {
        "tenants" => &state.tenant_url,
        "users" => &state.user_url,
        "categories" | "resources" => &state.resource_url,
        "bookings" => &state.booking_url,
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not_found", "message": "Unknown route" })),
            )
                .into_response();
        }
    };

    let query = request
        .uri()
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();
    let url = format!("{}{}{}", base.trim_end_matches('/'), path, query);

    let method = request.method().clone();
    let mut headers = reqwest::header::HeaderMap::new();
    for name in [header::AUTHORIZATION, header::CONTENT_TYPE] {
        if let Some(value) = request.headers().get(&name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    let body = match axum::body::to_bytes(request.into_body(), 2 * 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "validation", "message": "Request body too large" })),
            )
                .into_response();
        }
    };

    let upstream = state
        .client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .cloned();
            let bytes = response.bytes().await.unwrap_or_default();

            let mut builder = Response::builder().status(status);
            if let Some(content_type) = content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            builder
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(e) => {
            warn!(url = %url, "upstream request failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "dependency_unavailable",
                    "message": "Upstream service unreachable"
                })),
            )
                .into_response()
        }
    }
}
