use crate::domain::models::booking::{status, Booking, BookingEventRecord, NewBookingParams, RecurringPattern};
use crate::domain::models::event::{kinds, streams, BookingEventPayload, EventEnvelope};
use crate::domain::models::resource::{resource_status, WeekSchedule};
use crate::domain::ports::{BookingRepository, EventBus, ResourceDirectory, SettingsSource, UserDirectory};
use crate::domain::services::availability::parse_range;
use crate::domain::services::policy::SchedulingPolicy;
use crate::error::AppError;
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Candidate reservation as received from the API, times still raw strings
/// because their interpretation depends on the tenant's timezone.
pub struct BookingDraft {
    pub tenant_id: String,
    pub resource_id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<RecurringPattern>,
}

/// The booking-admission engine: policy gates, schedule containment and the
/// transactional conflict check, in that order. Everything it needs from the
/// other services arrives through capability ports.
pub struct AdmissionEngine {
    settings: Arc<dyn SettingsSource>,
    resources: Arc<dyn ResourceDirectory>,
    users: Arc<dyn UserDirectory>,
    repo: Arc<dyn BookingRepository>,
    bus: Arc<dyn EventBus>,
}

impl AdmissionEngine {
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        resources: Arc<dyn ResourceDirectory>,
        users: Arc<dyn UserDirectory>,
        repo: Arc<dyn BookingRepository>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            settings,
            resources,
            users,
            repo,
            bus,
        }
    }

    /// Admits a candidate booking, or the whole expanded batch when the
    /// draft is recurring. Batches are all-or-nothing.
    pub async fn admit(&self, draft: BookingDraft) -> Result<Vec<Booking>, AppError> {
        let settings = self.settings.settings_for(&draft.tenant_id).await?;
        let policy = SchedulingPolicy::from_settings(&settings)?;

        let resource = self
            .resources
            .fetch(&draft.resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
        if resource.tenant_id != draft.tenant_id {
            return Err(AppError::Unprocessable("Resource does not belong to this tenant".into()));
        }
        if resource.status != resource_status::AVAILABLE {
            return Err(AppError::Unprocessable("Resource is not available for booking".into()));
        }

        let user = self
            .users
            .fetch(&draft.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if user.tenant_id != draft.tenant_id {
            return Err(AppError::Unprocessable("User does not belong to this tenant".into()));
        }
        if !user.is_active || !user.can_book {
            return Err(AppError::Forbidden("User is not allowed to book".into()));
        }

        let start = policy.resolve_input(&draft.start_time)?;
        let end = policy.resolve_input(&draft.end_time)?;
        let schedule = resource.week_schedule();
        let now = Utc::now();

        let created = if draft.recurring_enabled {
            let pattern = draft
                .recurring_pattern
                .as_ref()
                .ok_or_else(|| AppError::Validation("recurring_pattern is required when recurring_enabled".into()))?;

            let occurrences = crate::domain::services::recurrence::expand(start, end, pattern)?;
            if occurrences.is_empty() {
                return Err(AppError::Unprocessable("Recurrence produced no occurrences".into()));
            }

            for (occ_start, occ_end) in &occurrences {
                policy.validate_booking_window(*occ_start, *occ_end, now)?;
                check_schedule(&schedule, &policy, *occ_start, *occ_end)?;
            }

            let group_id = Uuid::new_v4().to_string();
            let pattern_json = serde_json::to_string(pattern)
                .map_err(|e| AppError::InternalWithMsg(format!("Pattern serialization failed: {}", e)))?;

            let bookings: Vec<Booking> = occurrences
                .into_iter()
                .map(|(occ_start, occ_end)| {
                    Booking::new(NewBookingParams {
                        tenant_id: draft.tenant_id.clone(),
                        resource_id: draft.resource_id.clone(),
                        user_id: draft.user_id.clone(),
                        client_id: draft.client_id.clone(),
                        start_time: occ_start,
                        end_time: occ_end,
                        notes: draft.notes.clone(),
                        recurring_enabled: true,
                        recurring_pattern: Some(pattern_json.clone()),
                        recurrence_group_id: Some(group_id.clone()),
                    })
                })
                .collect();

            let records: Vec<BookingEventRecord> = bookings.iter().map(|b| event_record(kinds::BOOKING_CREATED, b)).collect();

            self.repo.create_batch_if_free(&bookings, &records).await?
        } else {
            policy.validate_booking_window(start, end, now)?;
            check_schedule(&schedule, &policy, start, end)?;

            let booking = Booking::new(NewBookingParams {
                tenant_id: draft.tenant_id,
                resource_id: draft.resource_id,
                user_id: draft.user_id,
                client_id: draft.client_id,
                start_time: start,
                end_time: end,
                notes: draft.notes,
                recurring_enabled: false,
                recurring_pattern: None,
                recurrence_group_id: None,
            });
            let record = event_record(kinds::BOOKING_CREATED, &booking);

            vec![self.repo.create_if_free(&booking, &record).await?]
        };

        for booking in &created {
            info!(booking_id = %booking.id, resource_id = %booking.resource_id, "booking admitted");
            self.publish(kinds::BOOKING_CREATED, booking).await;
        }
        Ok(created)
    }

    /// Re-runs the full pipeline for a time or resource change. The row
    /// itself is excluded from the conflict scan.
    pub async fn reschedule(
        &self,
        mut booking: Booking,
        new_resource_id: Option<String>,
        new_start: Option<String>,
        new_end: Option<String>,
    ) -> Result<Booking, AppError> {
        let settings = self.settings.settings_for(&booking.tenant_id).await?;
        let policy = SchedulingPolicy::from_settings(&settings)?;

        let resource_id = new_resource_id.unwrap_or_else(|| booking.resource_id.clone());
        let resource = self
            .resources
            .fetch(&resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
        if resource.tenant_id != booking.tenant_id {
            return Err(AppError::Unprocessable("Resource does not belong to this tenant".into()));
        }
        if resource.status != resource_status::AVAILABLE {
            return Err(AppError::Unprocessable("Resource is not available for booking".into()));
        }

        let start = match new_start {
            Some(raw) => policy.resolve_input(&raw)?,
            None => booking.start_time,
        };
        let end = match new_end {
            Some(raw) => policy.resolve_input(&raw)?,
            None => booking.end_time,
        };

        let now = Utc::now();
        policy.validate_booking_window(start, end, now)?;
        check_schedule(&resource.week_schedule(), &policy, start, end)?;

        booking.resource_id = resource_id;
        booking.start_time = start;
        booking.end_time = end;
        booking.updated_at = now;

        let record = event_record(kinds::BOOKING_UPDATED, &booking);
        let updated = self.repo.update_if_free(&booking, &record).await?;

        self.publish(kinds::BOOKING_UPDATED, &updated).await;
        Ok(updated)
    }

    /// Persists changes that need no re-admission (notes, client).
    pub async fn update_details(&self, mut booking: Booking) -> Result<Booking, AppError> {
        booking.updated_at = Utc::now();
        let record = event_record(kinds::BOOKING_UPDATED, &booking);
        let updated = self.repo.update(&booking, Some(&record)).await?;
        self.publish(kinds::BOOKING_UPDATED, &updated).await;
        Ok(updated)
    }

    /// Administrative status transition (pendente -> confirmado).
    pub async fn change_status(&self, mut booking: Booking, new_status: &str) -> Result<Booking, AppError> {
        if !status::ALL.contains(&new_status) {
            return Err(AppError::Validation(format!("Invalid status: {}", new_status)));
        }
        if !status::transition_allowed(&booking.status, new_status) {
            return Err(AppError::Unprocessable(format!(
                "Cannot transition booking from {} to {}",
                booking.status, new_status
            )));
        }

        booking.status = new_status.to_string();
        booking.updated_at = Utc::now();

        let record = event_record(kinds::BOOKING_STATUS_CHANGED, &booking);
        let updated = self.repo.update(&booking, Some(&record)).await?;
        self.publish(kinds::BOOKING_STATUS_CHANGED, &updated).await;
        Ok(updated)
    }

    /// User-initiated cancellation, guarded by the tenant's window.
    pub async fn cancel(
        &self,
        mut booking: Booking,
        cancelled_by: String,
        reason: Option<String>,
    ) -> Result<Booking, AppError> {
        if booking.status == status::CANCELLED {
            return Err(AppError::Unprocessable("Booking is already cancelled".into()));
        }

        let settings = self.settings.settings_for(&booking.tenant_id).await?;
        let policy = SchedulingPolicy::from_settings(&settings)?;
        let now = Utc::now();
        policy.validate_cancellation_window(booking.start_time, now)?;

        booking.status = status::CANCELLED.to_string();
        booking.cancellation_reason = reason;
        booking.cancelled_at = Some(now);
        booking.cancelled_by = Some(cancelled_by);
        booking.updated_at = now;

        let record = event_record(kinds::BOOKING_CANCELLED, &booking);
        let cancelled = self.repo.update(&booking, Some(&record)).await?;

        self.publish(kinds::BOOKING_CANCELLED, &cancelled).await;
        self.publish(kinds::BOOKING_STATUS_CHANGED, &cancelled).await;
        Ok(cancelled)
    }

    /// Post-commit, best-effort: the booking stays committed even when the
    /// fabric is down, and the audit row allows replay.
    async fn publish(&self, kind: &str, booking: &Booking) {
        let payload = BookingEventPayload::from_booking(booking);
        let envelope = EventEnvelope::new(
            kind,
            serde_json::to_value(&payload).unwrap_or_default(),
            &booking.tenant_id,
        );
        if let Err(e) = self.bus.publish(streams::BOOKING_EVENTS, &envelope).await {
            warn!(booking_id = %booking.id, event = kind, "event publish failed: {}", e);
        }
    }
}

fn event_record(kind: &str, booking: &Booking) -> BookingEventRecord {
    let payload = BookingEventPayload::from_booking(booking);
    BookingEventRecord::new(
        booking.id.clone(),
        booking.tenant_id.clone(),
        kind.to_string(),
        serde_json::to_value(&payload).unwrap_or_default(),
    )
}

/// The local interval must sit inside one of the resource's windows for
/// that weekday.
fn check_schedule(
    schedule: &WeekSchedule,
    policy: &SchedulingPolicy,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), AppError> {
    let start_local = start.with_timezone(&policy.tz);
    let end_local = end.with_timezone(&policy.tz);

    let windows = schedule
        .for_weekday(start_local.weekday())
        .ok_or_else(|| AppError::Unprocessable("Resource is closed on the requested day".into()))?;

    for entry in windows {
        let (win_start, win_end) = parse_range(entry)?;
        if win_start <= start_local.time() && end_local.time() <= win_end {
            return Ok(());
        }
    }
    Err(AppError::Unprocessable(
        "Requested time is outside the resource availability".into(),
    ))
}
