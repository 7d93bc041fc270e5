use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod status {
    pub const PENDING: &str = "pendente";
    pub const CONFIRMED: &str = "confirmado";
    pub const CANCELLED: &str = "cancelado";

    pub const ALL: [&str; 3] = [PENDING, CONFIRMED, CANCELLED];
    /// Statuses that occupy the resource and therefore conflict.
    pub const ACTIVE: [&str; 2] = [PENDING, CONFIRMED];

    /// pendente -> confirmado, pendente|confirmado -> cancelado.
    pub fn transition_allowed(from: &str, to: &str) -> bool {
        matches!(
            (from, to),
            (PENDING, CONFIRMED) | (PENDING, CANCELLED) | (CONFIRMED, CANCELLED)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub tenant_id: String,
    pub resource_id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub confirmation_code: String,
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<String>,
    pub recurrence_group_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub tenant_id: String,
    pub resource_id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<String>,
    pub recurrence_group_id: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            resource_id: params.resource_id,
            user_id: params.user_id,
            client_id: params.client_id,
            start_time: params.start_time,
            end_time: params.end_time,
            status: status::PENDING.to_string(),
            notes: params.notes,
            confirmation_code: code,
            recurring_enabled: params.recurring_enabled,
            recurring_pattern: params.recurring_pattern,
            recurrence_group_id: params.recurrence_group_id,
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != status::CANCELLED
    }
}

pub mod frequency {
    pub const DAILY: &str = "daily";
    pub const WEEKLY: &str = "weekly";
    pub const MONTHLY: &str = "monthly";

    pub const ALL: [&str; 3] = [DAILY, WEEKLY, MONTHLY];
}

/// Recurrence rule for a recurring create. `days_of_week` uses 0 = Monday
/// through 6 = Sunday and only applies to weekly frequency.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecurringPattern {
    pub frequency: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
}

fn default_interval() -> u32 {
    1
}

/// Audit row persisted in the admission transaction, before the stream
/// publish. Doubles as the replay source when a publish is lost.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingEventRecord {
    pub id: String,
    pub booking_id: String,
    pub tenant_id: String,
    pub event_type: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl BookingEventRecord {
    pub fn new(booking_id: String, tenant_id: String, event_type: String, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            tenant_id,
            event_type,
            payload: payload.to_string(),
            created_at: Utc::now(),
        }
    }
}
