use crate::domain::models::booking::Booking;
use crate::domain::models::user::User;
use crate::domain::services::availability::Slot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Serialize)]
pub struct PermissionSet {
    pub can_book: bool,
    pub can_manage_resources: bool,
    pub can_manage_users: bool,
    pub can_view_all_bookings: bool,
}

/// User row with the flat permission columns regrouped for the API.
#[derive(Serialize)]
pub struct UserOut {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: String,
    pub department: Option<String>,
    pub is_active: bool,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            user_type: user.user_type,
            department: user.department,
            is_active: user.is_active,
            permissions: PermissionSet {
                can_book: user.can_book,
                can_manage_resources: user.can_manage_resources,
                can_manage_users: user.can_manage_users,
                can_view_all_bookings: user.can_view_all_bookings,
            },
            created_at: user.created_at,
        }
    }
}

/// Booking row with the recurrence pattern re-inflated into JSON.
#[derive(Serialize)]
pub struct BookingOut {
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
    pub recurring_pattern: Option<serde_json::Value>,
    pub recurrence_group_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingOut {
    fn from(booking: Booking) -> Self {
        let recurring_pattern = booking
            .recurring_pattern
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        Self {
            id: booking.id,
            tenant_id: booking.tenant_id,
            resource_id: booking.resource_id,
            user_id: booking.user_id,
            client_id: booking.client_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
            notes: booking.notes,
            confirmation_code: booking.confirmation_code,
            recurring_enabled: booking.recurring_enabled,
            recurring_pattern,
            recurrence_group_id: booking.recurrence_group_id,
            cancellation_reason: booking.cancellation_reason,
            cancelled_at: booking.cancelled_at,
            cancelled_by: booking.cancelled_by,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// List item: `can_cancel` is evaluated against the tenant policy at read
/// time, not stored.
#[derive(Serialize)]
pub struct BookingWithPolicy {
    #[serde(flatten)]
    pub booking: BookingOut,
    pub can_cancel: bool,
}

#[derive(Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub resource_id: String,
    pub tenant_id: String,
    pub date: String,
    pub timezone: String,
    pub slots: Vec<Slot>,
}
