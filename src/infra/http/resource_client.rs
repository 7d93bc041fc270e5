use crate::domain::ports::{ResourceDirectory, ResourceSummary};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpResourceClient {
    client: Client,
    base_url: String,
}

impl HttpResourceClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl ResourceDirectory for HttpResourceClient {
    async fn fetch(&self, resource_id: &str) -> Result<Option<ResourceSummary>, AppError> {
        let url = format!("{}/internal/resources/{}", self.base_url.trim_end_matches('/'), resource_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("resource service unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::DependencyUnavailable(format!(
                "resource service returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| AppError::DependencyUnavailable(format!("resource service payload: {}", e)))
    }
}
