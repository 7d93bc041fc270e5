use crate::domain::models::webhook::Webhook;
use crate::domain::ports::WebhookSender;
use crate::domain::services::webhooks::{sign_payload, validate_webhook_url};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Delivers `{"event": ..., "data": ...}` to a registered endpoint with its
/// own 10s deadline. Never retried here: consumers log and move on.
pub struct HttpWebhookSender {
    client: Client,
}

impl HttpWebhookSender {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("reserva-backend-webhook/1.0")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpWebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, webhook: &Webhook, event_type: &str, payload: &serde_json::Value) -> Result<(), AppError> {
        if !validate_webhook_url(&webhook.url) {
            warn!(webhook_id = %webhook.id, url = %webhook.url, "refusing webhook with invalid URL");
            return Err(AppError::Validation("Invalid webhook URL".into()));
        }

        let body = json!({ "event": event_type, "data": payload }).to_string();

        let mut request = self
            .client
            .post(&webhook.url)
            .header("Content-Type", "application/json")
            .body(body.clone());

        if let Some(secret) = &webhook.secret {
            request = request.header("X-Webhook-Signature", sign_payload(secret, &body));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("webhook delivery failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InternalWithMsg(format!(
                "webhook endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
