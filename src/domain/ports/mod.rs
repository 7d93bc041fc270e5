use crate::domain::models::{
    booking::{Booking, BookingEventRecord},
    event::EventEnvelope,
    resource::{Category, Resource, WeekSchedule},
    tenant::{OrganizationSettings, Tenant},
    user::User,
    webhook::Webhook,
};
use crate::error::{AppError, ConflictEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant, settings: &OrganizationSettings) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, AppError>;
    async fn list(&self) -> Result<Vec<Tenant>, AppError>;
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    /// Removes the tenant with its settings and webhooks in one transaction.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn get_settings(&self, tenant_id: &str) -> Result<Option<OrganizationSettings>, AppError>;
    async fn update_settings(&self, settings: &OrganizationSettings) -> Result<OrganizationSettings, AppError>;
}

#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn create(&self, webhook: &Webhook) -> Result<Webhook, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Webhook>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Webhook>, AppError>;
    async fn update(&self, webhook: &Webhook) -> Result<Webhook, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub user_type: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<User>, AppError>;
    /// All users carrying this address across tenants; uniqueness is only
    /// per tenant, so login disambiguates by password.
    async fn find_by_email_any(&self, email: &str) -> Result<Vec<User>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str, filter: &UserFilter) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<Category, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Category>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Category>, AppError>;
    async fn update(&self, category: &Category) -> Result<Category, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn create(&self, resource: &Resource) -> Result<Resource, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Resource>, AppError>;
    async fn list_by_tenant(&self, tenant_id: &str, category_id: Option<&str>) -> Result<Vec<Resource>, AppError>;
    async fn update(&self, resource: &Resource) -> Result<Resource, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Returns the ids of the removed resources so their cached projections
    /// can be invalidated.
    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<Vec<String>, AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub tenant_id: String,
    pub resource_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Conflict check and insert in one transaction: the only place two
    /// concurrent admissions on the same resource are serialized. Overlap
    /// with an active booking aborts with `AppError::Conflict` carrying the
    /// offending rows. The audit record is written in the same transaction.
    async fn create_if_free(&self, booking: &Booking, event: &BookingEventRecord) -> Result<Booking, AppError>;
    /// Batch variant for recurring creates: every occurrence is checked
    /// against one snapshot and either all rows commit or none do.
    async fn create_batch_if_free(
        &self,
        bookings: &[Booking],
        events: &[BookingEventRecord],
    ) -> Result<Vec<Booking>, AppError>;
    /// Same contract as `create_if_free` for a rescheduled row; the row
    /// itself is excluded from the conflict scan.
    async fn update_if_free(&self, booking: &Booking, event: &BookingEventRecord) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    async fn find_conflicts(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ignore_booking_id: Option<&str>,
    ) -> Result<Vec<ConflictEntry>, AppError>;
    async fn update(&self, booking: &Booking, event: Option<&BookingEventRecord>) -> Result<Booking, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Cascade: flips every active booking of the resource to cancelado and
    /// returns the rows that changed.
    async fn cancel_by_resource(&self, resource_id: &str, reason: &str) -> Result<Vec<Booking>, AppError>;
    async fn cancel_by_user(&self, user_id: &str, reason: &str) -> Result<Vec<Booking>, AppError>;
    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError>;
}

/// Shared key/value cache. Adapters never fail the caller: errors degrade to
/// a miss on reads and are logged on writes.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);
    async fn delete(&self, key: &str);
    /// Deletes every key matching a trailing-`*` glob.
    async fn delete_matching(&self, pattern: &str);
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, stream: &str, envelope: &EventEnvelope) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub id: String,
    pub envelope: EventEnvelope,
}

/// Consumer-group view of a stream. Messages stay pending until acked, so a
/// crashed consumer's claims are reprocessed on restart.
#[async_trait]
pub trait EventStream: Send + Sync {
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), AppError>;
    async fn read_new(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block_ms: u64,
    ) -> Result<Vec<StreamMessage>, AppError>;
    async fn read_pending(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamMessage>, AppError>;
    async fn ack(&self, stream: &str, group: &str, message_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError>;
}

/// Supplier of a tenant's scheduling policy. Realized by the tenant repo
/// (inside the tenant service), an HTTP client (other services), and the
/// cache-with-fallback composition in domain::services::settings.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn settings_for(&self, tenant_id: &str) -> Result<OrganizationSettings, AppError>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResourceSummary {
    pub id: String,
    pub tenant_id: String,
    pub status: String,
    pub availability_schedule: String,
}

impl ResourceSummary {
    pub fn week_schedule(&self) -> WeekSchedule {
        serde_json::from_str(&self.availability_schedule).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserSummary {
    pub id: String,
    pub tenant_id: String,
    pub user_type: String,
    pub is_active: bool,
    pub can_book: bool,
    pub can_manage_resources: bool,
    pub can_view_all_bookings: bool,
}

impl UserSummary {
    pub fn is_admin(&self) -> bool {
        self.user_type == crate::domain::models::user::user_type::ADMIN
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn exists(&self, tenant_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn fetch(&self, resource_id: &str) -> Result<Option<ResourceSummary>, AppError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserSummary>, AppError>;
}

#[async_trait]
pub trait BookingDirectory: Send + Sync {
    /// Active (non-cancelled) bookings of a resource overlapping the window.
    async fn active_in_window(
        &self,
        tenant_id: &str,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BookingWindow>, AppError>;
}

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, webhook: &Webhook, event_type: &str, payload: &serde_json::Value) -> Result<(), AppError>;
}

/// Readiness check for /ready: true when the service's store answers.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn ready(&self) -> bool;
}
