use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: String, domain: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            domain,
            logo_url: None,
            theme_primary_color: None,
            plan: plan::BASIC.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

pub mod plan {
    pub const BASIC: &str = "basico";
    pub const PROFESSIONAL: &str = "profissional";
}

/// Per-tenant scheduling policy row. Working hours are stored as local
/// "HH:MM" strings and `custom_labels` as a JSON object; both are parsed
/// where they are consumed. The whole row travels between services as JSON
/// (settings endpoint, cache entry), so it stays Serialize + Deserialize.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct OrganizationSettings {
    pub id: String,
    pub tenant_id: String,
    pub business_type: String,
    pub timezone: String,
    pub working_hours_start: String,
    pub working_hours_end: String,
    pub booking_interval: i32,
    pub advance_booking_days: i32,
    pub cancellation_hours: i32,
    pub custom_labels: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationSettings {
    pub fn defaults_for(tenant_id: String, business_type: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            business_type,
            timezone: "UTC".to_string(),
            working_hours_start: "08:00".to_string(),
            working_hours_end: "18:00".to_string(),
            booking_interval: 30,
            advance_booking_days: 30,
            cancellation_hours: 24,
            custom_labels: "{}".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tenant-facing vocabulary stored inside `custom_labels`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CustomLabels {
    #[serde(default)]
    pub resource_singular: Option<String>,
    #[serde(default)]
    pub resource_plural: Option<String>,
    #[serde(default)]
    pub booking_label: Option<String>,
    #[serde(default)]
    pub user_label: Option<String>,
}
