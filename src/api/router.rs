use crate::api::handlers::{booking, category, health, resource, tenant, user, webhook};
use crate::config::Config;
use crate::state::{BookingState, ResourceState, TenantState, UserState};
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

/// Shared middleware stack: request-scoped tracing span plus CORS from
/// configuration.
fn apply_layers(router: Router, config: &Config) -> Router {
    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|failure: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", failure);
                }),
        )
        .layer(cors_layer(config))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let wildcard = config.cors_origins.iter().any(|o| o == "*");
    if wildcard || !config.cors_allow_credentials {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if wildcard {
            layer.allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = config.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
            layer.allow_origin(origins)
        }
    } else {
        // Credentials cannot be combined with wildcards.
        let origins: Vec<HeaderValue> = config.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

pub fn tenant_router(state: Arc<TenantState>) -> Router {
    let probe = state.probe.clone();
    let config = state.config.clone();
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(move || health::readiness(probe.clone())))
        .route("/tenants", post(tenant::create_tenant).get(tenant::list_tenants))
        .route("/tenants/", post(tenant::create_tenant).get(tenant::list_tenants))
        .route(
            "/tenants/{tenant_id}",
            get(tenant::get_tenant).put(tenant::update_tenant).delete(tenant::delete_tenant),
        )
        .route(
            "/tenants/{tenant_id}/settings",
            get(tenant::get_settings).put(tenant::update_settings),
        )
        .route(
            "/tenants/{tenant_id}/webhooks",
            post(webhook::create_webhook).get(webhook::list_webhooks),
        )
        .route(
            "/tenants/{tenant_id}/webhooks/{webhook_id}",
            get(webhook::get_webhook).put(webhook::update_webhook).delete(webhook::delete_webhook),
        )
        .route("/internal/tenants/{tenant_id}/settings", get(tenant::internal_get_settings))
        .with_state(state);
    apply_layers(router, &config)
}

pub fn user_router(state: Arc<UserState>) -> Router {
    let probe = state.probe.clone();
    let config = state.config.clone();
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(move || health::readiness(probe.clone())))
        .route("/users", post(user::create_user).get(user::list_users))
        .route("/users/", post(user::create_user).get(user::list_users))
        .route("/users/login", post(user::login))
        .route("/users/me", get(user::me))
        .route(
            "/users/{user_id}",
            get(user::get_user).put(user::update_user).delete(user::delete_user),
        )
        .route("/internal/users/{user_id}", get(user::internal_get_user))
        .with_state(state);
    apply_layers(router, &config)
}

pub fn resource_router(state: Arc<ResourceState>) -> Router {
    let probe = state.probe.clone();
    let config = state.config.clone();
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(move || health::readiness(probe.clone())))
        .route("/categories", post(category::create_category).get(category::list_categories))
        .route("/categories/", post(category::create_category).get(category::list_categories))
        .route(
            "/categories/{category_id}",
            get(category::get_category).put(category::update_category).delete(category::delete_category),
        )
        .route("/resources", post(resource::create_resource).get(resource::list_resources))
        .route("/resources/", post(resource::create_resource).get(resource::list_resources))
        .route(
            "/resources/{resource_id}",
            get(resource::get_resource).put(resource::update_resource).delete(resource::delete_resource),
        )
        .route("/resources/{resource_id}/availability", get(resource::get_availability))
        .route("/internal/resources/{resource_id}", get(resource::internal_get_resource))
        .with_state(state);
    apply_layers(router, &config)
}

pub fn booking_router(state: Arc<BookingState>) -> Router {
    let probe = state.probe.clone();
    let config = state.config.clone();
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(move || health::readiness(probe.clone())))
        .route("/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/bookings/", post(booking::create_booking).get(booking::list_bookings))
        .route(
            "/bookings/{booking_id}",
            get(booking::get_booking).put(booking::update_booking).delete(booking::delete_booking),
        )
        .route("/bookings/{booking_id}/cancel", patch(booking::cancel_booking))
        .route("/bookings/{booking_id}/status", patch(booking::update_status))
        .route("/internal/bookings/window", get(booking::internal_bookings_window))
        .with_state(state);
    apply_layers(router, &config)
}
