use crate::domain::models::event::{DeletionEvent, EventEnvelope};
use crate::domain::ports::{EventHandler, UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// User-service view of `deletion-events`.
pub struct UserCascadeHandler {
    repo: Arc<dyn UserRepository>,
}

impl UserCascadeHandler {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EventHandler for UserCascadeHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        if let Some(DeletionEvent::TenantDeleted { tenant_id }) = DeletionEvent::parse(envelope) {
            let removed = self.repo.delete_by_tenant(&tenant_id).await?;
            info!(tenant_id = %tenant_id, count = removed, "users removed for deleted tenant");
        }
        Ok(())
    }
}

/// User-service view of `booking-events`. Actual delivery (email/SMS) sits
/// behind an external service; this handler is the hook point and currently
/// just records the intent.
pub struct BookingNotificationHandler;

#[async_trait]
impl EventHandler for BookingNotificationHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        debug!(
            event_type = %envelope.event_type,
            tenant_id = %envelope.metadata.tenant_id,
            "booking event observed for user notifications"
        );
        Ok(())
    }
}
