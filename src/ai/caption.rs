use super::client::EndpointClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::CaptionService;
use crate::error::ApiError;
use crate::models::{EndpointConfig, Platform};
use crate::platform::caption_token_budget;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const CAPTION_TIMEOUT: Duration = Duration::from_secs(90);
pub const CAPTION_TEMPERATURE: f32 = 0.7;

/// Chat/vision completion client producing post captions.
pub struct CaptionClient {
    http: EndpointClient,
}

impl CaptionClient {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self::new_with_client(endpoint, reqwest::Client::new())
    }

    pub fn new_with_client(endpoint: EndpointConfig, client: reqwest::Client) -> Self {
        Self {
            http: EndpointClient::new_with_client(endpoint, CAPTION_TIMEOUT, client),
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl CaptionService for CaptionClient {
    async fn complete(&self, messages: Vec<ChatMessage>, platform: Platform) -> Result<String> {
        let request = ChatCompletionRequest {
            messages,
            max_tokens: caption_token_budget(platform),
            temperature: CAPTION_TEMPERATURE,
        };

        tracing::debug!(
            "Sending caption request ({} messages, max_tokens {}) to {}",
            request.messages.len(),
            request.max_tokens,
            self.http.url()
        );

        let response: ChatCompletionResponse = self.http.post(&request).await?.json()?;

        let caption = response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                tracing::error!("Caption response had no content in the first choice");
                ApiError::EmptyCompletion
            })?;

        Ok(caption.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHAT_PATH: &str = "/openai/deployments/gpt4/chat/completions";

    fn make_client(server: &MockServer) -> CaptionClient {
        CaptionClient::new(EndpointConfig {
            url: format!("{}{}", server.uri(), CHAT_PATH),
            api_key: "test-key".to_string(),
        })
    }

    fn completion(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }))
    }

    #[tokio::test]
    async fn test_complete_parses_and_trims_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(header("api-key", "test-key"))
            .respond_with(completion(serde_json::json!("  Big news today! 🚀\n")))
            .mount(&server)
            .await;

        let caption = make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::LinkedIn)
            .await
            .unwrap();
        assert_eq!(caption, "Big news today! 🚀");
    }

    #[tokio::test]
    async fn test_complete_sends_budget_and_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 330,
                "temperature": 0.7,
                "messages": [{ "role": "user", "content": "hi" }]
            })))
            .respond_with(completion(serde_json::json!("ok")))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::Twitter)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_linkedin_budget_is_capped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "max_tokens": 500 })))
            .respond_with(completion(serde_json::json!("ok")))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::LinkedIn)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(completion(serde_json::Value::Null))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::Facebook)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_whitespace_content_is_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(completion(serde_json::json!("   ")))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::Facebook)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::Facebook)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete(vec![ChatMessage::user("hi")], Platform::Facebook)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::MalformedBody(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(completion(serde_json::json!("late")).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .with_timeout(Duration::from_millis(50))
            .complete(vec![ChatMessage::user("hi")], Platform::Facebook)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Timeout { .. })));
    }
}
