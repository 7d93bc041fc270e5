use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Outbound notification endpoint registered by a tenant. `events` is a JSON
/// array of event-type strings ("booking.created", ...).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Webhook {
    pub id: String,
    pub tenant_id: String,
    pub url: String,
    pub events: String,
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    pub fn new(tenant_id: String, url: String, events: Vec<String>, secret: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            url,
            events: serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()),
            secret,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn subscribed_events(&self) -> Vec<String> {
        serde_json::from_str(&self.events).unwrap_or_default()
    }

    pub fn listens_to(&self, event_type: &str) -> bool {
        self.subscribed_events().iter().any(|e| e == event_type)
    }
}
