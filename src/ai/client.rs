use super::types::ApiErrorBody;
use crate::error::ApiError;
use crate::models::EndpointConfig;
use crate::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Single-endpoint JSON client shared by the caption and image modules.
///
/// The endpoint URL is used as-is (deployment URLs already carry their path
/// and `api-version` query), and the key travels in the `api-key` header.
pub struct EndpointClient {
    pub(crate) client: Client,
    endpoint: EndpointConfig,
    timeout: Duration,
}

/// Successful (2xx) response, kept raw so callers can inspect headers.
#[derive(Debug)]
pub struct EndpointResponse {
    pub headers: HeaderMap,
    pub body: String,
}

impl EndpointResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!("Failed to parse API response: {}\nBody: {}", e, self.body);
            Error::Api(ApiError::MalformedBody(e.to_string()))
        })
    }
}

impl EndpointClient {
    pub fn new_with_client(endpoint: EndpointConfig, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn post<Req: Serialize>(&self, request: &Req) -> Result<EndpointResponse> {
        let url = self.url();
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header("api-key", &self.endpoint.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", url, e);
                if e.is_timeout() {
                    ApiError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    ApiError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ApiError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if !status.is_success() {
            tracing::error!("API error (status {}): {}", status, body);
            return Err(classify_error(status, &body, url).into());
        }

        Ok(EndpointResponse { headers, body })
    }
}

/// Map a non-2xx response onto the user-facing error kinds. Content-policy and
/// image-format rejections win over the generic status mapping.
pub fn classify_error(status: StatusCode, body: &str, url: &str) -> ApiError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error);

    let code = detail
        .as_ref()
        .and_then(|d| d.code.as_ref())
        .map(|c| match c {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    let message = detail
        .and_then(|d| d.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    if code.contains("content_filter") || message.contains("content management policy") {
        return ApiError::ContentPolicy { message };
    }
    if code == "InvalidImageSize" || code == "InvalidImageUrl" || message.contains("InvalidImage")
    {
        return ApiError::InvalidImage { message };
    }

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Authentication,
        StatusCode::NOT_FOUND => ApiError::NotFound {
            url: url.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
