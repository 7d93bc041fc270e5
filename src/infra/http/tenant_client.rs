use crate::domain::models::tenant::OrganizationSettings;
use crate::domain::ports::{SettingsSource, TenantDirectory};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Reads tenant state over the service's internal surface. Internal routes
/// are only reachable inside the mesh; the gateway never proxies them.
pub struct HttpTenantClient {
    client: Client,
    base_url: String,
}

impl HttpTenantClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }

    fn settings_url(&self, tenant_id: &str) -> String {
        format!("{}/internal/tenants/{}/settings", self.base_url.trim_end_matches('/'), tenant_id)
    }
}

#[async_trait]
impl SettingsSource for HttpTenantClient {
    async fn settings_for(&self, tenant_id: &str) -> Result<OrganizationSettings, AppError> {
        let response = self
            .client
            .get(self.settings_url(tenant_id))
            .send()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("tenant service unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Tenant not found".into()));
        }
        if !response.status().is_success() {
            return Err(AppError::DependencyUnavailable(format!(
                "tenant service returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("tenant service payload: {}", e)))
    }
}

#[async_trait]
impl TenantDirectory for HttpTenantClient {
    async fn exists(&self, tenant_id: &str) -> Result<bool, AppError> {
        match self.settings_for(tenant_id).await {
            Ok(_) => Ok(true),
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
