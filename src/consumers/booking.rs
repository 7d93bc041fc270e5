use crate::domain::models::event::{kinds, streams, BookingEventPayload, DeletionEvent, EventEnvelope};
use crate::domain::ports::{BookingRepository, EventBus, EventHandler};
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub mod reason {
    pub const RESOURCE_DELETED: &str = "resource_deleted";
    pub const USER_DELETED: &str = "user_deleted";
}

/// Booking-service view of `deletion-events`. All three handlers are
/// idempotent: cancelling targets only still-active rows and deleting absent
/// rows is a no-op, so redelivery converges on the same state.
pub struct BookingCascadeHandler {
    repo: Arc<dyn BookingRepository>,
    bus: Arc<dyn EventBus>,
}

impl BookingCascadeHandler {
    pub fn new(repo: Arc<dyn BookingRepository>, bus: Arc<dyn EventBus>) -> Self {
        Self { repo, bus }
    }

    async fn publish_cancellations(&self, cancelled: Vec<crate::domain::models::booking::Booking>) {
        for booking in cancelled {
            let payload = BookingEventPayload::from_booking(&booking);
            let envelope = EventEnvelope::new(
                kinds::BOOKING_CANCELLED,
                serde_json::to_value(&payload).unwrap_or_default(),
                &booking.tenant_id,
            );
            if let Err(e) = self.bus.publish(streams::BOOKING_EVENTS, &envelope).await {
                warn!(booking_id = %booking.id, "cascade booking.cancelled publish failed: {}", e);
            }
        }
    }
}

#[async_trait]
impl EventHandler for BookingCascadeHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        let Some(event) = DeletionEvent::parse(envelope) else {
            return Ok(());
        };

        match event {
            DeletionEvent::ResourceDeleted { resource_id, .. } => {
                let cancelled = self.repo.cancel_by_resource(&resource_id, reason::RESOURCE_DELETED).await?;
                info!(resource_id = %resource_id, count = cancelled.len(), "bookings cancelled for deleted resource");
                self.publish_cancellations(cancelled).await;
            }
            DeletionEvent::UserDeleted { user_id, .. } => {
                let cancelled = self.repo.cancel_by_user(&user_id, reason::USER_DELETED).await?;
                info!(user_id = %user_id, count = cancelled.len(), "bookings cancelled for deleted user");
                self.publish_cancellations(cancelled).await;
            }
            DeletionEvent::TenantDeleted { tenant_id } => {
                // Terminal cascade: rows are removed outright, no per-booking
                // events.
                let removed = self.repo.delete_by_tenant(&tenant_id).await?;
                info!(tenant_id = %tenant_id, count = removed, "bookings removed for deleted tenant");
            }
        }
        Ok(())
    }
}
