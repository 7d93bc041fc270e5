use crate::api::dtos::requests::{
    BookingListQuery, BookingWindowQuery, CancelBookingRequest, CreateBookingRequest, StatusQuery,
    UpdateBookingRequest,
};
use crate::api::dtos::responses::{BookingOut, BookingWithPolicy};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::Booking;
use crate::domain::ports::BookingFilter;
use crate::domain::services::admission::BookingDraft;
use crate::domain::services::auth::Claims;
use crate::domain::services::{authz, policy::SchedulingPolicy};
use crate::error::AppError;
use crate::state::BookingState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(tenant_id) = &payload.tenant_id {
        authz::require_same_tenant(&claims, tenant_id)?;
    }

    let draft = BookingDraft {
        tenant_id: claims.tenant_id.clone(),
        resource_id: payload.resource_id,
        user_id: payload.user_id.unwrap_or_else(|| claims.sub.clone()),
        client_id: payload.client_id,
        start_time: payload.start_time,
        end_time: payload.end_time,
        notes: payload.notes,
        recurring_enabled: payload.recurring_enabled,
        recurring_pattern: payload.recurring_pattern,
    };

    let created = state.admission.admit(draft).await?;
    let mut out: Vec<BookingOut> = created.into_iter().map(BookingOut::from).collect();

    if out.len() == 1 {
        let single = out.pop().unwrap();
        Ok((StatusCode::CREATED, Json(serde_json::to_value(single).unwrap_or_default())))
    } else {
        Ok((StatusCode::CREATED, Json(serde_json::to_value(out).unwrap_or_default())))
    }
}

pub async fn list_bookings(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = query.tenant_id.unwrap_or_else(|| claims.tenant_id.clone());
    authz::require_same_tenant(&claims, &tenant_id)?;

    // Users without the view-all grant only see their own bookings.
    let caller = state.users.fetch(&claims.sub).await?.ok_or(AppError::Unauthorized)?;
    let user_id = if caller.is_admin() || caller.can_view_all_bookings {
        query.user_id
    } else {
        Some(claims.sub.clone())
    };

    let filter = BookingFilter {
        tenant_id: tenant_id.clone(),
        resource_id: query.resource_id,
        user_id,
        status: query.status,
        start_date: parse_optional_instant(query.start_date.as_deref())?,
        end_date: parse_optional_instant(query.end_date.as_deref())?,
    };

    let bookings = state.booking_repo.list(&filter).await?;

    let settings = state.settings.settings_for(&tenant_id).await?;
    let policy = SchedulingPolicy::from_settings(&settings)?;
    let now = Utc::now();

    let enriched: Vec<BookingWithPolicy> = bookings
        .into_iter()
        .map(|b| {
            let can_cancel = b.is_active() && policy.can_cancel(b.start_time, now);
            BookingWithPolicy {
                booking: BookingOut::from(b),
                can_cancel,
            }
        })
        .collect();

    Ok(Json(enriched))
}

pub async fn get_booking(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = fetch_tenant_booking(&state, &claims, &booking_id).await?;

    // Same visibility rule as listing: owners see their own bookings, anyone
    // else needs the admin role or the view-all grant.
    if booking.user_id != claims.sub {
        let caller = state.users.fetch(&claims.sub).await?.ok_or(AppError::Unauthorized)?;
        if !caller.is_admin() && !caller.can_view_all_bookings {
            return Err(AppError::Forbidden("Not allowed to view another user's booking".into()));
        }
    }

    Ok(Json(BookingOut::from(booking)))
}

pub async fn update_booking(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut booking = fetch_tenant_booking(&state, &claims, &booking_id).await?;
    authz::require_self_or_admin(&claims, &booking.tenant_id, &booking.user_id)?;

    if let Some(notes) = payload.notes {
        booking.notes = Some(notes);
    }
    if let Some(client_id) = payload.client_id {
        booking.client_id = Some(client_id);
    }

    let reschedules =
        payload.start_time.is_some() || payload.end_time.is_some() || payload.resource_id.is_some();

    let updated = if reschedules {
        state
            .admission
            .reschedule(booking, payload.resource_id, payload.start_time, payload.end_time)
            .await?
    } else if let Some(status) = payload.status {
        state.admission.change_status(booking, &status).await?
    } else {
        state.admission.update_details(booking).await?
    };

    info!(booking_id = %booking_id, "booking updated");
    Ok(Json(BookingOut::from(updated)))
}

pub async fn cancel_booking(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = fetch_tenant_booking(&state, &claims, &booking_id).await?;
    authz::require_self_or_admin(&claims, &booking.tenant_id, &booking.user_id)?;

    let cancelled = state
        .admission
        .cancel(booking, claims.sub.clone(), payload.reason)
        .await?;

    info!(booking_id = %booking_id, "booking cancelled");
    Ok(Json(BookingOut::from(cancelled)))
}

pub async fn update_status(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Path(booking_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin(&claims)?;
    let booking = fetch_tenant_booking(&state, &claims, &booking_id).await?;

    let updated = state.admission.change_status(booking, &query.status).await?;
    Ok(Json(BookingOut::from(updated)))
}

pub async fn delete_booking(
    State(state): State<Arc<BookingState>>,
    AuthUser(claims): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin(&claims)?;
    fetch_tenant_booking(&state, &claims, &booking_id).await?;

    state.booking_repo.delete(&booking_id).await?;
    info!(booking_id = %booking_id, "booking deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Mesh-internal read feeding the availability projection: active bookings
/// of a resource overlapping the requested window.
pub async fn internal_bookings_window(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<BookingWindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_instant(&query.start_date)?;
    let end = parse_instant(&query.end_date)?;

    let conflicts = state
        .booking_repo
        .find_conflicts(&query.resource_id, start, end, None)
        .await?;
    let windows: Vec<serde_json::Value> = conflicts
        .into_iter()
        .map(|c| serde_json::json!({ "start_time": c.start_time, "end_time": c.end_time }))
        .collect();
    Ok(Json(windows))
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("Invalid timestamp: {}", raw)))
}

fn parse_optional_instant(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    raw.map(parse_instant).transpose()
}

async fn fetch_tenant_booking(
    state: &BookingState,
    claims: &Claims,
    booking_id: &str,
) -> Result<Booking, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
    if booking.tenant_id != claims.tenant_id {
        return Err(AppError::Forbidden("Access to another tenant is not allowed".into()));
    }
    Ok(booking)
}
