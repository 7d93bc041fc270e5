use crate::domain::models::event::EventEnvelope;
use crate::domain::ports::{EventHandler, WebhookRepository, WebhookSender};
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Tenant-service view of `booking-events`: fan each event out to the
/// tenant's matching webhooks. Delivery failures are logged and the message
/// is still acked; webhooks are best-effort by contract.
pub struct WebhookDispatchHandler {
    repo: Arc<dyn WebhookRepository>,
    sender: Arc<dyn WebhookSender>,
}

impl WebhookDispatchHandler {
    pub fn new(repo: Arc<dyn WebhookRepository>, sender: Arc<dyn WebhookSender>) -> Self {
        Self { repo, sender }
    }
}

#[async_trait]
impl EventHandler for WebhookDispatchHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        let tenant_id = &envelope.metadata.tenant_id;
        if tenant_id.is_empty() {
            return Ok(());
        }

        let webhooks = self.repo.list_by_tenant(tenant_id).await?;
        for webhook in webhooks {
            if !webhook.is_active || !webhook.listens_to(&envelope.event_type) {
                continue;
            }
            match self.sender.send(&webhook, &envelope.event_type, &envelope.payload).await {
                Ok(()) => info!(
                    webhook_id = %webhook.id,
                    event_type = %envelope.event_type,
                    "webhook delivered"
                ),
                Err(e) => warn!(
                    webhook_id = %webhook.id,
                    event_type = %envelope.event_type,
                    "webhook delivery failed: {}", e
                ),
            }
        }
        Ok(())
    }
}
