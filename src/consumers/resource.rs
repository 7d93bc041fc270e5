use crate::domain::models::event::{DeletionEvent, EventEnvelope};
use crate::domain::ports::{Cache, CategoryRepository, EventHandler, ResourceRepository};
use crate::error::AppError;
use crate::infra::cache::availability_cache_pattern;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Resource-service view of `booking-events`: any booking change makes the
/// resource's cached projections stale. Dropping every date for the resource
/// is a superset of the affected keys and safely idempotent.
pub struct AvailabilityInvalidationHandler {
    cache: Arc<dyn Cache>,
}

impl AvailabilityInvalidationHandler {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventHandler for AvailabilityInvalidationHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        if !envelope.event_type.starts_with("booking.") {
            return Ok(());
        }
        if let Some(resource_id) = envelope.payload.get("resource_id").and_then(|v| v.as_str()) {
            self.cache.delete_matching(&availability_cache_pattern(resource_id)).await;
        }
        Ok(())
    }
}

/// Resource-service view of `deletion-events`.
pub struct ResourceCascadeHandler {
    category_repo: Arc<dyn CategoryRepository>,
    resource_repo: Arc<dyn ResourceRepository>,
    cache: Arc<dyn Cache>,
}

impl ResourceCascadeHandler {
    pub fn new(
        category_repo: Arc<dyn CategoryRepository>,
        resource_repo: Arc<dyn ResourceRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            category_repo,
            resource_repo,
            cache,
        }
    }
}

#[async_trait]
impl EventHandler for ResourceCascadeHandler {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        let Some(event) = DeletionEvent::parse(envelope) else {
            return Ok(());
        };

        match event {
            DeletionEvent::TenantDeleted { tenant_id } => {
                let resource_ids = self.resource_repo.delete_by_tenant(&tenant_id).await?;
                let categories = self.category_repo.delete_by_tenant(&tenant_id).await?;
                for resource_id in &resource_ids {
                    self.cache.delete_matching(&availability_cache_pattern(resource_id)).await;
                }
                info!(
                    tenant_id = %tenant_id,
                    resources = resource_ids.len(),
                    categories,
                    "resource store purged for deleted tenant"
                );
            }
            DeletionEvent::ResourceDeleted { resource_id, .. } => {
                // The API handler already removed the row; redelivery or a
                // peer instance only needs the cache cleared.
                self.cache.delete_matching(&availability_cache_pattern(&resource_id)).await;
            }
            DeletionEvent::UserDeleted { .. } => {}
        }
        Ok(())
    }
}
