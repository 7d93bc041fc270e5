use crate::api::dtos::requests::{CreateTenantRequest, UpdateSettingsRequest, UpdateTenantRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::{kinds, streams, EventEnvelope};
use crate::domain::models::tenant::{CustomLabels, OrganizationSettings, Tenant};
use crate::domain::services::{authz, policy::parse_time_of_day, settings::settings_cache_key};
use crate::error::AppError;
use crate::state::TenantState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn create_tenant(
    State(state): State<Arc<TenantState>>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.tenant_repo.find_by_domain(&payload.domain).await?.is_some() {
        return Err(AppError::Validation("Domain already registered".into()));
    }

    let mut tenant = Tenant::new(payload.name, payload.domain);
    tenant.logo_url = payload.logo_url;
    tenant.theme_primary_color = payload.theme_primary_color;
    if let Some(plan) = payload.plan {
        tenant.plan = plan;
    }

    let mut settings = OrganizationSettings::defaults_for(
        tenant.id.clone(),
        payload.business_type.unwrap_or_else(|| "geral".to_string()),
    );
    if let Some(timezone) = payload.timezone {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::Unprocessable(format!("Unknown timezone: {}", timezone)));
        }
        settings.timezone = timezone;
    }

    let created = state.tenant_repo.create(&tenant, &settings).await?;
    info!(tenant_id = %created.id, "tenant created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_tenants(State(state): State<Arc<TenantState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.tenant_repo.list().await?))
}

pub async fn get_tenant(
    State(state): State<Arc<TenantState>>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = state
        .tenant_repo
        .find_by_id(&tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;
    Ok(Json(tenant))
}

pub async fn update_tenant(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;

    let mut tenant = state
        .tenant_repo
        .find_by_id(&tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

    if let Some(domain) = &payload.domain {
        if let Some(existing) = state.tenant_repo.find_by_domain(domain).await? {
            if existing.id != tenant_id {
                return Err(AppError::Validation("Domain already registered".into()));
            }
        }
        tenant.domain = domain.clone();
    }
    if let Some(name) = payload.name {
        tenant.name = name;
    }
    if let Some(logo_url) = payload.logo_url {
        tenant.logo_url = Some(logo_url);
    }
    if let Some(color) = payload.theme_primary_color {
        tenant.theme_primary_color = Some(color);
    }
    if let Some(plan) = payload.plan {
        tenant.plan = plan;
    }
    if let Some(is_active) = payload.is_active {
        tenant.is_active = is_active;
    }
    tenant.updated_at = Utc::now();

    let updated = state.tenant_repo.update(&tenant).await?;
    info!(tenant_id = %tenant_id, "tenant updated");
    Ok(Json(updated))
}

/// Terminal: removes the tenant's own store rows and starts the cascade that
/// converges the other services.
pub async fn delete_tenant(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;

    state.tenant_repo.delete(&tenant_id).await?;
    state.cache.delete(&settings_cache_key(&tenant_id)).await;

    let envelope = EventEnvelope::new(kinds::TENANT_DELETED, json!({ "tenant_id": tenant_id }), &tenant_id);
    if let Err(e) = state.events.publish(streams::DELETION_EVENTS, &envelope).await {
        warn!(tenant_id = %tenant_id, "tenant.deleted publish failed: {}", e);
    }

    info!(tenant_id = %tenant_id, "tenant deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;
    let settings = state
        .tenant_repo
        .get_settings(&tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<Arc<TenantState>>,
    AuthUser(claims): AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &tenant_id)?;

    let mut settings = state
        .tenant_repo
        .get_settings(&tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

    if let Some(business_type) = payload.business_type {
        settings.business_type = business_type;
    }
    if let Some(timezone) = payload.timezone {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::Unprocessable(format!("Unknown timezone: {}", timezone)));
        }
        settings.timezone = timezone;
    }
    if let Some(start) = payload.working_hours_start {
        parse_time_of_day(&start)?;
        settings.working_hours_start = start;
    }
    if let Some(end) = payload.working_hours_end {
        parse_time_of_day(&end)?;
        settings.working_hours_end = end;
    }
    if parse_time_of_day(&settings.working_hours_end)? <= parse_time_of_day(&settings.working_hours_start)? {
        return Err(AppError::Unprocessable(
            "working_hours_end must be after working_hours_start".into(),
        ));
    }
    if let Some(interval) = payload.booking_interval {
        if interval <= 0 {
            return Err(AppError::Unprocessable("booking_interval must be positive".into()));
        }
        settings.booking_interval = interval;
    }
    if let Some(days) = payload.advance_booking_days {
        if days < 0 {
            return Err(AppError::Unprocessable("advance_booking_days must not be negative".into()));
        }
        settings.advance_booking_days = days;
    }
    if let Some(hours) = payload.cancellation_hours {
        if hours < 0 {
            return Err(AppError::Unprocessable("cancellation_hours must not be negative".into()));
        }
        settings.cancellation_hours = hours;
    }
    if let Some(labels) = payload.custom_labels {
        let parsed: CustomLabels = serde_json::from_value(labels)
            .map_err(|e| AppError::Unprocessable(format!("Invalid custom_labels: {}", e)))?;
        settings.custom_labels = serde_json::to_string(&parsed).unwrap_or_else(|_| "{}".to_string());
    }
    settings.updated_at = Utc::now();

    let updated = state.tenant_repo.update_settings(&settings).await?;
    // Stale policy must not outlive the authoritative write.
    state.cache.delete(&settings_cache_key(&tenant_id)).await;

    info!(tenant_id = %tenant_id, "organization settings updated");
    Ok(Json(updated))
}

/// Mesh-internal read used by the other services' settings sources.
pub async fn internal_get_settings(
    State(state): State<Arc<TenantState>>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state
        .tenant_repo
        .get_settings(&tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;
    Ok(Json(settings))
}
