use crate::client::{ApiClient, RequestOptions};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{HealthInfo, UpdateHealthInfo};

/// The rich-text health information page.
#[derive(Debug, Clone)]
pub struct HealthInfoService {
    client: ApiClient,
}

impl HealthInfoService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Public; no token needed.
    pub fn get_health_info(&self) -> Result<Vec<HealthInfo>, ApiError> {
        self.client.public_fetch("/health-info/all", RequestOptions::get())?.into_data()
    }

    pub fn update_health_info(&self, id: u64, content: &str) -> Result<Envelope, ApiError> {
        let payload = UpdateHealthInfo {
            content: content.to_string(),
        };
        self.client.api_fetch(
            &format!("/health-info/update/{id}"),
            RequestOptions::json(HttpMethod::Put, &payload)?,
        )
    }
}
