use crate::domain::ports::{UserDirectory, UserSummary};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpUserClient {
    client: Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl UserDirectory for HttpUserClient {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserSummary>, AppError> {
        let url = format!("{}/internal/users/{}", self.base_url.trim_end_matches('/'), user_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("user service unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::DependencyUnavailable(format!(
                "user service returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| AppError::DependencyUnavailable(format!("user service payload: {}", e)))
    }
}
