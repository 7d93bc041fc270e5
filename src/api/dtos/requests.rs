use crate::domain::models::booking::RecurringPattern;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: Option<String>,
    pub business_type: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub business_type: Option<String>,
    pub timezone: Option<String>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub booking_interval: Option<i32>,
    pub advance_booking_days: Option<i32>,
    pub cancellation_hours: Option<i32>,
    pub custom_labels: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
    pub secret: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateWebhookRequest {
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: Option<String>,
    pub department: Option<String>,
    pub password: String,
}

#[derive(Deserialize, Default)]
pub struct PermissionsPatch {
    pub can_book: Option<bool>,
    pub can_manage_resources: Option<bool>,
    pub can_manage_users: Option<bool>,
    pub can_view_all_bookings: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub password: Option<String>,
    // Admin-only fields.
    pub user_type: Option<String>,
    pub is_active: Option<bool>,
    pub permissions: Option<PermissionsPatch>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub tenant_id: String,
    pub user_type: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_type: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_type: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub category_metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct CreateResourceRequest {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub availability_schedule: serde_json::Value,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateResourceRequest {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub availability_schedule: Option<serde_json::Value>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ResourceListQuery {
    pub category_id: Option<String>,
}

/// `data` is the tenant-local calendar date, YYYY-MM-DD.
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub data: String,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub tenant_id: Option<String>,
    pub resource_id: String,
    pub user_id: Option<String>,
    pub client_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<RecurringPattern>,
}

#[derive(Deserialize)]
pub struct UpdateBookingRequest {
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub tenant_id: Option<String>,
    pub resource_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Deserialize)]
pub struct BookingWindowQuery {
    pub tenant_id: String,
    pub resource_id: String,
    pub start_date: String,
    pub end_date: String,
}
