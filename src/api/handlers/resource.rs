use crate::api::dtos::requests::{AvailabilityQuery, CreateResourceRequest, ResourceListQuery, UpdateResourceRequest};
use crate::api::dtos::responses::AvailabilityResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::{kinds, streams, EventEnvelope};
use crate::domain::models::resource::{resource_status, NewResourceParams, Resource, WeekSchedule};
use crate::domain::ports::ResourceSummary;
use crate::domain::services::auth::Claims;
use crate::domain::services::availability::{parse_range, project_slots};
use crate::domain::services::policy::SchedulingPolicy;
use crate::error::AppError;
use crate::infra::cache::{availability_cache_key, availability_cache_pattern};
use crate::state::ResourceState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Resource writes need the caller's `can_manage_resources` flag, which
/// lives in the user service, not in the claims.
async fn require_resource_manager(state: &ResourceState, claims: &Claims) -> Result<(), AppError> {
    let caller = state
        .users
        .fetch(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if caller.tenant_id != claims.tenant_id {
        return Err(AppError::Forbidden("Access to another tenant is not allowed".into()));
    }
    if !caller.is_admin() && !caller.can_manage_resources {
        return Err(AppError::Forbidden("Resource management permission required".into()));
    }
    Ok(())
}

/// Rejects malformed schedules up front so projection never sees them.
fn parse_schedule(value: &serde_json::Value) -> Result<WeekSchedule, AppError> {
    let schedule: WeekSchedule = serde_json::from_value(value.clone())
        .map_err(|e| AppError::Unprocessable(format!("Invalid availability_schedule: {}", e)))?;
    for windows in [
        &schedule.monday,
        &schedule.tuesday,
        &schedule.wednesday,
        &schedule.thursday,
        &schedule.friday,
        &schedule.saturday,
        &schedule.sunday,
    ]
    .into_iter()
    .flatten()
    {
        for entry in windows {
            parse_range(entry).map_err(|_| {
                AppError::Unprocessable(format!("Invalid availability window: {}", entry))
            })?;
        }
    }
    Ok(schedule)
}

pub async fn create_resource(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_resource_manager(&state, &claims).await?;

    if state
        .category_repo
        .find_by_id(&claims.tenant_id, &payload.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Unprocessable("Category not found".into()));
    }
    parse_schedule(&payload.availability_schedule)?;

    let resource = Resource::new(NewResourceParams {
        tenant_id: claims.tenant_id.clone(),
        category_id: payload.category_id,
        name: payload.name,
        description: payload.description,
        capacity: payload.capacity,
        location: payload.location,
        attributes: payload.attributes.map(|a| a.to_string()).unwrap_or_else(|| "{}".to_string()),
        availability_schedule: payload.availability_schedule.to_string(),
        image_url: payload.image_url,
    });

    let created = state.resource_repo.create(&resource).await?;
    info!(resource_id = %created.id, tenant_id = %claims.tenant_id, "resource created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_resources(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ResourceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resources = state
        .resource_repo
        .list_by_tenant(&claims.tenant_id, query.category_id.as_deref())
        .await?;
    Ok(Json(resources))
}

pub async fn get_resource(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = fetch_tenant_resource(&state, &claims, &resource_id).await?;
    Ok(Json(resource))
}

pub async fn update_resource(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(resource_id): Path<String>,
    Json(payload): Json<UpdateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_resource_manager(&state, &claims).await?;
    let mut resource = fetch_tenant_resource(&state, &claims, &resource_id).await?;

    if let Some(category_id) = payload.category_id {
        if state
            .category_repo
            .find_by_id(&claims.tenant_id, &category_id)
            .await?
            .is_none()
        {
            return Err(AppError::Unprocessable("Category not found".into()));
        }
        resource.category_id = category_id;
    }
    if let Some(status) = payload.status {
        if !resource_status::ALL.contains(&status.as_str()) {
            return Err(AppError::Validation(format!("Invalid resource status: {}", status)));
        }
        resource.status = status;
    }
    if let Some(name) = payload.name {
        resource.name = name;
    }
    if let Some(description) = payload.description {
        resource.description = Some(description);
    }
    if let Some(capacity) = payload.capacity {
        resource.capacity = Some(capacity);
    }
    if let Some(location) = payload.location {
        resource.location = Some(location);
    }
    if let Some(attributes) = payload.attributes {
        resource.attributes = attributes.to_string();
    }
    if let Some(schedule) = payload.availability_schedule {
        parse_schedule(&schedule)?;
        resource.availability_schedule = schedule.to_string();
    }
    if let Some(image_url) = payload.image_url {
        resource.image_url = Some(image_url);
    }
    resource.updated_at = Utc::now();

    let updated = state.resource_repo.update(&resource).await?;
    // The schedule or status may have changed; cached projections are stale.
    state.cache.delete_matching(&availability_cache_pattern(&resource_id)).await;

    info!(resource_id = %resource_id, "resource updated");
    Ok(Json(updated))
}

pub async fn delete_resource(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_resource_manager(&state, &claims).await?;
    fetch_tenant_resource(&state, &claims, &resource_id).await?;

    state.resource_repo.delete(&resource_id).await?;
    state.cache.delete_matching(&availability_cache_pattern(&resource_id)).await;

    let envelope = EventEnvelope::new(
        kinds::RESOURCE_DELETED,
        json!({ "resource_id": resource_id, "tenant_id": claims.tenant_id }),
        &claims.tenant_id,
    );
    if let Err(e) = state.events.publish(streams::DELETION_EVENTS, &envelope).await {
        warn!(resource_id = %resource_id, "resource.deleted publish failed: {}", e);
    }

    info!(resource_id = %resource_id, "resource deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// UTC window covering the whole local calendar day, tolerant of zones whose
/// midnight falls into a DST gap.
fn local_day_bounds(date: NaiveDate, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = tz
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .or_else(|| tz.from_local_datetime(&date.and_hms_opt(1, 0, 0).unwrap()).earliest())
        .ok_or_else(|| AppError::Unprocessable("Unrepresentable local day".into()))?;
    let end = tz
        .from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
        .latest()
        .ok_or_else(|| AppError::Unprocessable("Unrepresentable local day".into()))?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

pub async fn get_availability(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(resource_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&query.data, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format, expected YYYY-MM-DD".into()))?;

    let cache_key = availability_cache_key(&resource_id, &query.data);
    if let Some(raw) = state.cache.get(&cache_key).await {
        if let Ok(cached) = serde_json::from_str::<AvailabilityResponse>(&raw) {
            if cached.tenant_id == claims.tenant_id {
                return Ok(Json(cached));
            }
        }
    }

    let resource = fetch_tenant_resource(&state, &claims, &resource_id).await?;
    if resource.status != resource_status::AVAILABLE {
        return Err(AppError::Unprocessable("Resource is not available for bookings".into()));
    }

    let settings = state.settings.settings_for(&resource.tenant_id).await?;
    let policy = SchedulingPolicy::from_settings(&settings)?;

    let now = Utc::now();
    let today_local = now.with_timezone(&policy.tz).date_naive();
    if date < today_local {
        return Err(AppError::Unprocessable("Date must be today or later".into()));
    }
    if date > today_local + Duration::days(policy.advance_booking_days) {
        return Err(AppError::Unprocessable(format!(
            "Availability is limited to {} days in advance",
            policy.advance_booking_days
        )));
    }

    let (day_start, day_end) = local_day_bounds(date, policy.tz)?;
    let bookings = state
        .bookings
        .active_in_window(&resource.tenant_id, &resource.id, day_start, day_end)
        .await?;

    let slots = project_slots(&resource.week_schedule(), date, &policy, &bookings, now)?;

    let response = AvailabilityResponse {
        resource_id: resource.id.clone(),
        tenant_id: resource.tenant_id.clone(),
        date: query.data.clone(),
        timezone: settings.timezone.clone(),
        slots,
    };

    if let Ok(raw) = serde_json::to_string(&response) {
        state
            .cache
            .set(&cache_key, &raw, state.config.cache_ttl_availability)
            .await;
    }
    Ok(Json(response))
}

/// Mesh-internal read used by the booking service's admission engine.
pub async fn internal_get_resource(
    State(state): State<Arc<ResourceState>>,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state
        .resource_repo
        .find_by_id(&resource_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
    Ok(Json(ResourceSummary {
        id: resource.id,
        tenant_id: resource.tenant_id,
        status: resource.status,
        availability_schedule: resource.availability_schedule,
    }))
}

async fn fetch_tenant_resource(
    state: &ResourceState,
    claims: &Claims,
    resource_id: &str,
) -> Result<Resource, AppError> {
    let resource = state
        .resource_repo
        .find_by_id(resource_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
    if resource.tenant_id != claims.tenant_id {
        return Err(AppError::Forbidden("Access to another tenant is not allowed".into()));
    }
    Ok(resource)
}
