use crate::domain::models::booking::{Booking, BookingEventRecord};
use crate::domain::ports::{BookingFilter, BookingRepository};
use crate::error::{AppError, ConflictEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Row-locking conflict scan; holding the locks until commit is what
    /// keeps two simultaneous admissions on the same resource from both
    /// succeeding.
    async fn locked_conflicts(
        tx: &mut Transaction<'_, Postgres>,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ignore_booking_id: Option<&str>,
    ) -> Result<Vec<ConflictEntry>, AppError> {
        let rows = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE resource_id = $1 AND status IN ('pendente', 'confirmado') AND start_time < $2 AND end_time > $3 AND ($4::text IS NULL OR id != $4) FOR UPDATE")
            .bind(resource_id).bind(end).bind(start).bind(ignore_booking_id)
            .fetch_all(&mut **tx).await.map_err(AppError::Database)?;
        Ok(rows.into_iter().map(|b| ConflictEntry { booking_id: b.id, start_time: b.start_time, end_time: b.end_time }).collect())
    }

    async fn insert_booking(tx: &mut Transaction<'_, Postgres>, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, confirmation_code, recurring_enabled, recurring_pattern, recurrence_group_id, cancellation_reason, cancelled_at, cancelled_by, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) RETURNING *")
            .bind(&booking.id).bind(&booking.tenant_id).bind(&booking.resource_id).bind(&booking.user_id)
            .bind(&booking.client_id).bind(booking.start_time).bind(booking.end_time).bind(&booking.status)
            .bind(&booking.notes).bind(&booking.confirmation_code).bind(booking.recurring_enabled)
            .bind(&booking.recurring_pattern).bind(&booking.recurrence_group_id).bind(&booking.cancellation_reason)
            .bind(booking.cancelled_at).bind(&booking.cancelled_by).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut **tx).await.map_err(AppError::Database)
    }

    async fn insert_event(tx: &mut Transaction<'_, Postgres>, event: &BookingEventRecord) -> Result<(), AppError> {
        sqlx::query("INSERT INTO booking_events (id, booking_id, tenant_id, event_type, payload, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(&event.id).bind(&event.booking_id).bind(&event.tenant_id).bind(&event.event_type).bind(&event.payload).bind(event.created_at)
            .execute(&mut **tx).await.map_err(AppError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_if_free(&self, booking: &Booking, event: &BookingEventRecord) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let conflicts = Self::locked_conflicts(&mut tx, &booking.resource_id, booking.start_time, booking.end_time, None).await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict("Resource already booked in this interval".into(), conflicts));
        }
        let created = Self::insert_booking(&mut tx, booking).await?;
        Self::insert_event(&mut tx, event).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn create_batch_if_free(&self, bookings: &[Booking], events: &[BookingEventRecord]) -> Result<Vec<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for booking in bookings {
            let conflicts = Self::locked_conflicts(&mut tx, &booking.resource_id, booking.start_time, booking.end_time, None).await?;
            if !conflicts.is_empty() {
                return Err(AppError::Conflict("Resource already booked in this interval".into(), conflicts));
            }
        }
        let mut created = Vec::with_capacity(bookings.len());
        for booking in bookings {
            created.push(Self::insert_booking(&mut tx, booking).await?);
        }
        for event in events {
            Self::insert_event(&mut tx, event).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update_if_free(&self, booking: &Booking, event: &BookingEventRecord) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let conflicts = Self::locked_conflicts(&mut tx, &booking.resource_id, booking.start_time, booking.end_time, Some(&booking.id)).await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict("Resource already booked in this interval".into(), conflicts));
        }
        let updated = sqlx::query_as::<_, Booking>("UPDATE bookings SET resource_id = $1, start_time = $2, end_time = $3, notes = $4, client_id = $5, updated_at = $6 WHERE id = $7 RETURNING *")
            .bind(&booking.resource_id).bind(booking.start_time).bind(booking.end_time).bind(&booking.notes)
            .bind(&booking.client_id).bind(booking.updated_at).bind(&booking.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        Self::insert_event(&mut tx, event).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE tenant_id = $1 ORDER BY start_time ASC")
            .bind(&filter.tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(apply_filter(rows, filter))
    }

    async fn find_conflicts(&self, resource_id: &str, start: DateTime<Utc>, end: DateTime<Utc>, ignore_booking_id: Option<&str>) -> Result<Vec<ConflictEntry>, AppError> {
        let rows = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE resource_id = $1 AND status IN ('pendente', 'confirmado') AND start_time < $2 AND end_time > $3 AND ($4::text IS NULL OR id != $4)")
            .bind(resource_id).bind(end).bind(start).bind(ignore_booking_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(rows.into_iter().map(|b| ConflictEntry { booking_id: b.id, start_time: b.start_time, end_time: b.end_time }).collect())
    }

    async fn update(&self, booking: &Booking, event: Option<&BookingEventRecord>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let updated = sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1, notes = $2, client_id = $3, cancellation_reason = $4, cancelled_at = $5, cancelled_by = $6, updated_at = $7 WHERE id = $8 RETURNING *")
            .bind(&booking.status).bind(&booking.notes).bind(&booking.client_id).bind(&booking.cancellation_reason)
            .bind(booking.cancelled_at).bind(&booking.cancelled_by).bind(booking.updated_at).bind(&booking.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if let Some(event) = event {
            Self::insert_event(&mut tx, event).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Booking not found".into())); }
        Ok(())
    }

    async fn cancel_by_resource(&self, resource_id: &str, reason: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'cancelado', cancellation_reason = $1, cancelled_at = $2, updated_at = $2 WHERE resource_id = $3 AND status IN ('pendente', 'confirmado') RETURNING *")
            .bind(reason).bind(Utc::now()).bind(resource_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel_by_user(&self, user_id: &str, reason: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'cancelado', cancellation_reason = $1, cancelled_at = $2, updated_at = $2 WHERE user_id = $3 AND status IN ('pendente', 'confirmado') RETURNING *")
            .bind(reason).bind(Utc::now()).bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE tenant_id = $1").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM booking_events WHERE tenant_id = $1").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}

/// Optional list filters applied in one place for both backends.
pub(crate) fn apply_filter(rows: Vec<Booking>, filter: &BookingFilter) -> Vec<Booking> {
    rows.into_iter()
        .filter(|b| filter.resource_id.as_deref().map_or(true, |r| b.resource_id == r))
        .filter(|b| filter.user_id.as_deref().map_or(true, |u| b.user_id == u))
        .filter(|b| filter.status.as_deref().map_or(true, |s| b.status == s))
        .filter(|b| match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) => {
                (b.start_time >= start && b.start_time < end) || (b.end_time > start && b.end_time <= end)
            }
            _ => true,
        })
        .collect()
}
