use crate::domain::models::tenant::OrganizationSettings;
use crate::domain::ports::{Cache, SettingsSource, TenantRepository};
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub fn settings_cache_key(tenant_id: &str) -> String {
    format!("settings:tenant:{}", tenant_id)
}

/// Cache-with-fallback composition over any settings supplier. A hard
/// failure of the inner source propagates; the engine never substitutes
/// permissive defaults, since that could silently admit out-of-hours
/// bookings.
pub struct CachedSettings {
    inner: Arc<dyn SettingsSource>,
    cache: Arc<dyn Cache>,
    ttl_secs: u64,
}

impl CachedSettings {
    pub fn new(inner: Arc<dyn SettingsSource>, cache: Arc<dyn Cache>, ttl_secs: u64) -> Self {
        Self { inner, cache, ttl_secs }
    }
}

#[async_trait]
impl SettingsSource for CachedSettings {
    async fn settings_for(&self, tenant_id: &str) -> Result<OrganizationSettings, AppError> {
        let key = settings_cache_key(tenant_id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(settings) => return Ok(settings),
                Err(e) => warn!("Discarding unreadable cached settings for {}: {}", tenant_id, e),
            }
        }

        let settings = self.inner.settings_for(tenant_id).await?;
        if let Ok(raw) = serde_json::to_string(&settings) {
            self.cache.set(&key, &raw, self.ttl_secs).await;
        }
        Ok(settings)
    }
}

/// Repository-backed supplier, used inside the tenant service itself.
pub struct RepoSettingsSource {
    repo: Arc<dyn TenantRepository>,
}

impl RepoSettingsSource {
    pub fn new(repo: Arc<dyn TenantRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SettingsSource for RepoSettingsSource {
    async fn settings_for(&self, tenant_id: &str) -> Result<OrganizationSettings, AppError> {
        self.repo
            .get_settings(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
    }
}
