use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod streams {
    pub const BOOKING_EVENTS: &str = "booking-events";
    pub const DELETION_EVENTS: &str = "deletion-events";
}

pub mod kinds {
    pub const BOOKING_CREATED: &str = "booking.created";
    pub const BOOKING_UPDATED: &str = "booking.updated";
    pub const BOOKING_CANCELLED: &str = "booking.cancelled";
    pub const BOOKING_STATUS_CHANGED: &str = "booking.status_changed";
    pub const RESOURCE_DELETED: &str = "resource.deleted";
    pub const USER_DELETED: &str = "user.deleted";
    pub const TENANT_DELETED: &str = "tenant.deleted";
}

pub const EVENT_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventMetadata {
    pub tenant_id: String,
    pub emitted_at: DateTime<Utc>,
    pub event_version: String,
}

/// Wire envelope for both streams. On Redis the three fields travel as
/// stream entry fields, with `payload` and `metadata` JSON-encoded.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventEnvelope {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    pub fn new(event_type: &str, payload: serde_json::Value, tenant_id: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            payload,
            metadata: EventMetadata {
                tenant_id: tenant_id.to_string(),
                emitted_at: Utc::now(),
                event_version: EVENT_VERSION.to_string(),
            },
        }
    }
}

/// Cascade events, parsed out of the `deletion-events` envelope so handlers
/// can dispatch on a closed set instead of raw strings.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionEvent {
    ResourceDeleted { resource_id: String, tenant_id: String },
    UserDeleted { user_id: String, tenant_id: String },
    TenantDeleted { tenant_id: String },
}

impl DeletionEvent {
    pub fn parse(envelope: &EventEnvelope) -> Option<Self> {
        let payload = &envelope.payload;
        let field = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(str::to_string);

        match envelope.event_type.as_str() {
            kinds::RESOURCE_DELETED => Some(Self::ResourceDeleted {
                resource_id: field("resource_id")?,
                tenant_id: field("tenant_id").unwrap_or_else(|| envelope.metadata.tenant_id.clone()),
            }),
            kinds::USER_DELETED => Some(Self::UserDeleted {
                user_id: field("user_id")?,
                tenant_id: field("tenant_id").unwrap_or_else(|| envelope.metadata.tenant_id.clone()),
            }),
            kinds::TENANT_DELETED => Some(Self::TenantDeleted {
                tenant_id: field("tenant_id").unwrap_or_else(|| envelope.metadata.tenant_id.clone()),
            }),
            _ => None,
        }
    }
}

/// Payload of every `booking.*` event.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingEventPayload {
    pub booking_id: String,
    pub tenant_id: String,
    pub resource_id: String,
    pub user_id: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
}

impl BookingEventPayload {
    pub fn from_booking(b: &crate::domain::models::booking::Booking) -> Self {
        Self {
            booking_id: b.id.clone(),
            tenant_id: b.tenant_id.clone(),
            resource_id: b.resource_id.clone(),
            user_id: b.user_id.clone(),
            status: b.status.clone(),
            start_time: b.start_time,
            end_time: b.end_time,
            reason: b.cancellation_reason.clone(),
            cancelled_by: b.cancelled_by.clone(),
        }
    }
}
