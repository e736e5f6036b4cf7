use super::client::EndpointClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use super::ImageGenerationService;
use crate::error::ApiError;
use crate::models::EndpointConfig;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(120);
pub const IMAGE_SIZE: &str = "1024x1024";

/// Header carrying the status URL when a deployment answers with a job.
const OPERATION_LOCATION: &str = "operation-location";

/// Image-generation client returning the URL of a single square image.
pub struct ImageClient {
    http: EndpointClient,
}

impl ImageClient {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self::new_with_client(endpoint, reqwest::Client::new())
    }

    pub fn new_with_client(endpoint: EndpointConfig, client: reqwest::Client) -> Self {
        Self {
            http: EndpointClient::new_with_client(endpoint, IMAGE_TIMEOUT, client),
        }
    }
}

#[async_trait]
impl ImageGenerationService for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ImageGenerationRequest {
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        tracing::debug!("Sending image generation request to {}", self.http.url());

        let response = self.http.post(&request).await?;
        let parsed: ImageGenerationResponse = response.json()?;

        if let Some(url) = parsed.first_url() {
            return Ok(url.to_string());
        }

        if parsed.id.is_some() || response.headers.contains_key(OPERATION_LOCATION) {
            tracing::warn!(
                "Image endpoint returned an operation reference (id {:?}); polling is not supported",
                parsed.id
            );
            return Err(ApiError::AsyncJobUnsupported.into());
        }

        tracing::error!("Unexpected image response structure: {}", response.body);
        Err(ApiError::MalformedBody("Could not find image URL".to_string()).into())
    }
}
