use crate::api::dtos::requests::{CreateWebhookRequest, UpdateWebhookRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::webhook::Webhook;
use crate::domain::services::{authz, webhooks::validate_webhook_url};
use crate::error::AppError;
use crate::state::TenantState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn create_webhook(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<CreateWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;

    if !validate_webhook_url(&payload.url) {
        return Err(AppError::Unprocessable(
            "Webhook URL must be https:// (or http://localhost for development)".into(),
        ));
    }

    let webhook = Webhook::new(tenant_id.clone(), payload.url, payload.events, payload.secret);
    let created = state.webhook_repo.create(&webhook).await?;
    info!(webhook_id = %created.id, tenant_id = %tenant_id, "webhook registered");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_webhooks(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;
    Ok(Json(state.webhook_repo.list_by_tenant(&tenant_id).await?))
}

pub async fn get_webhook(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path((tenant_id, webhook_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;
    let webhook = state
        .webhook_repo
        .find_by_id(&tenant_id, &webhook_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Webhook not found".into()))?;
    Ok(Json(webhook))
}

pub async fn update_webhook(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path((tenant_id, webhook_id)): Path<(String, String)>,
    Json(payload): Json<UpdateWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;

    let mut webhook = state
        .webhook_repo
        .find_by_id(&tenant_id, &webhook_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Webhook not found".into()))?;

    if let Some(url) = payload.url {
        if !validate_webhook_url(&url) {
            return Err(AppError::Unprocessable(
                "Webhook URL must be https:// (or http://localhost for development)".into(),
            ));
        }
        webhook.url = url;
    }
    if let Some(events) = payload.events {
        webhook.events = serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string());
    }
    if let Some(secret) = payload.secret {
        webhook.secret = Some(secret);
    }
    if let Some(is_active) = payload.is_active {
        webhook.is_active = is_active;
    }

    Ok(Json(state.webhook_repo.update(&webhook).await?))
}

pub async fn delete_webhook(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path((tenant_id, webhook_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;
    state.webhook_repo.delete(&tenant_id, &webhook_id).await?;
    info!(webhook_id = %webhook_id, "webhook removed");
    Ok(StatusCode::NO_CONTENT)
}
