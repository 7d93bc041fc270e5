use crate::domain::ports::{BookingDirectory, BookingWindow};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;

pub struct HttpBookingClient {
    client: Client,
    base_url: String,
}

impl HttpBookingClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl BookingDirectory for HttpBookingClient {
    async fn active_in_window(
        &self,
        tenant_id: &str,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BookingWindow>, AppError> {
        let url = format!("{}/internal/bookings/window", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("tenant_id", tenant_id),
                ("resource_id", resource_id),
                ("start_date", &start.to_rfc3339()),
                ("end_date", &end.to_rfc3339()),
            ])
            .send()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("booking service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DependencyUnavailable(format!(
                "booking service returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("booking service payload: {}", e)))
    }
}
