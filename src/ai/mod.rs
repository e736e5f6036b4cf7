//! AI service integration for caption and image generation
//!
//! Thin clients for the chat/vision completion endpoint and the
//! image-generation endpoint, plus canned mocks for tests.

pub mod caption;
pub mod client;
pub mod image;
pub mod mock;
pub mod types;

pub use caption::CaptionClient;
pub use image::ImageClient;
pub use mock::{MockCaptionClient, MockImageClient};
pub use types::{ChatMessage, MessagePart};

use crate::models::Platform;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Run one completion and return the first choice's text.
    async fn complete(&self, messages: Vec<ChatMessage>, platform: Platform) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image and return its URL.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
