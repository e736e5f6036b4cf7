use super::types::ChatMessage;
use super::{CaptionService, ImageGenerationService};
use crate::error::ApiError;
use crate::models::Platform;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum MockReply {
    Ok(String),
    Fail(fn() -> ApiError),
}

/// Canned caption service. Replies cycle in order; with none configured it
/// answers with a caption naming the platform.
#[derive(Clone, Default)]
pub struct MockCaptionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<(Vec<ChatMessage>, Platform)>>>,
    call_count: Arc<Mutex<usize>>,
    completed_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockCaptionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caption_response(self, response: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Ok(response));
        self
    }

    pub fn with_error(self, error: fn() -> ApiError) -> Self {
        self.replies.lock().unwrap().push(MockReply::Fail(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Calls that ran to completion (including failing ones).
    pub fn get_completed_count(&self) -> usize {
        *self.completed_count.lock().unwrap()
    }

    pub fn get_requests(&self) -> Vec<(Vec<ChatMessage>, Platform)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptionService for MockCaptionClient {
    async fn complete(&self, messages: Vec<ChatMessage>, platform: Platform) -> Result<String> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.requests.lock().unwrap().push((messages, platform));

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Ok(format!("A mock caption for {}", platform))
            } else {
                replies[(*count - 1) % replies.len()].clone()
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        *self.completed_count.lock().unwrap() += 1;

        match reply {
            MockReply::Ok(text) => Ok(text),
            MockReply::Fail(error) => Err(error().into()),
        }
    }
}

/// Canned image-generation service returning URLs.
#[derive(Clone, Default)]
pub struct MockImageClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    completed_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_response(self, url: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Ok(url));
        self
    }

    pub fn with_error(self, error: fn() -> ApiError) -> Self {
        self.replies.lock().unwrap().push(MockReply::Fail(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_completed_count(&self) -> usize {
        *self.completed_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.prompts.lock().unwrap().push(prompt.to_string());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Ok(format!("https://mock-images.example.com/{}.png", *count))
            } else {
                replies[(*count - 1) % replies.len()].clone()
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        *self.completed_count.lock().unwrap() += 1;

        match reply {
            MockReply::Ok(url) => Ok(url),
            MockReply::Fail(error) => Err(error().into()),
        }
    }
}
