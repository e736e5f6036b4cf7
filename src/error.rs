//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Every failure is recovered at the dashboard boundary and rendered through
//! [`Error::user_message`].

use thiserror::Error;

/// Remote service whose endpoint/key pair is checked before a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Caption endpoint used with an inline image.
    Vision,
    /// Caption endpoint used with a text prompt.
    Caption,
    /// Image-generation endpoint.
    ImageGeneration,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Service::Vision => "Azure GPT-4 Vision",
            Service::Caption => "Azure GPT-4",
            Service::ImageGeneration => "Azure DALL-E",
        };
        f.write_str(name)
    }
}

/// Input rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a prompt OR upload an image.")]
    EmptyInput,

    #[error("Please select a valid image file (JPG, PNG, GIF, WEBP). Got: {mime}")]
    InvalidType { mime: String },

    #[error(
        "Image file is too large ({size} bytes, max 4MB for Vision API). Please choose a smaller image."
    )]
    TooLarge { size: u64 },
}

/// Failure reported by (or while reaching) a remote generation endpoint.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed")]
    Authentication,

    #[error("Endpoint not found ({url})")]
    NotFound { url: String },

    #[error("Rate limit/quota exceeded")]
    RateLimited,

    #[error("Content safety policy violation: {message}")]
    ContentPolicy { message: String },

    #[error("Image processing issue: {message}")]
    InvalidImage { message: String },

    #[error("Could not reach API ({url}): {message}")]
    Network { url: String, message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Image generation started asynchronously, but polling for the result is not supported")]
    AsyncJobUnsupported,

    #[error("Empty content in completion response")]
    EmptyCompletion,

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response structure: {0}")]
    MalformedBody(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} API endpoint or key missing.")]
    MissingConfiguration(Service),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("A generation is already in progress")]
    Busy,

    #[error("No image URL available to download.")]
    NoImage,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Single human-readable message shown to the user, with guidance for
    /// the common status codes.
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingConfiguration(service) => {
                format!("Error: {} API endpoint or key missing.", service)
            }
            Error::Validation(e) => e.to_string(),
            Error::Api(api) => match api {
                ApiError::Authentication => {
                    "API Error (401): Authentication failed. Check API Key.".to_string()
                }
                ApiError::NotFound { url } => format!(
                    "API Error (404): Endpoint not found ({}). Check Endpoint URL.",
                    url
                ),
                ApiError::RateLimited => {
                    "API Error (429): Rate limit/quota exceeded. Check resource limits/usage."
                        .to_string()
                }
                ApiError::ContentPolicy { message } => {
                    format!("API Error: {} - Content safety policy violation.", message)
                }
                ApiError::InvalidImage { message } => format!(
                    "API Error: {} - Image processing issue (check format/size).",
                    message
                ),
                ApiError::Network { url, message } => format!(
                    "Network error: Could not reach API ({}). Check connection/URL. ({})",
                    url, message
                ),
                ApiError::Timeout { url } => format!(
                    "Network error: Request to {} timed out. Check connection/URL.",
                    url
                ),
                ApiError::Status { status, message } => {
                    format!("API Error ({}): {}", status, message)
                }
                other => format!("Error: {}", other),
            },
            Error::Download(_) => self.to_string(),
            other => format!("Error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_messages_are_distinct() {
        let vision = Error::MissingConfiguration(Service::Vision).user_message();
        let caption = Error::MissingConfiguration(Service::Caption).user_message();
        let image = Error::MissingConfiguration(Service::ImageGeneration).user_message();

        assert_ne!(vision, caption);
        assert_ne!(caption, image);
        assert!(image.contains("DALL-E"));
    }

    #[test]
    fn test_status_guidance() {
        assert!(Error::Api(ApiError::Authentication)
            .user_message()
            .contains("Check API Key"));
        assert!(Error::Api(ApiError::NotFound {
            url: "https://x.test".to_string()
        })
        .user_message()
        .contains("Check Endpoint URL"));
        assert!(Error::Api(ApiError::RateLimited)
            .user_message()
            .contains("quota"));
        assert!(Error::Api(ApiError::Network {
            url: "https://x.test".to_string(),
            message: "connection refused".to_string()
        })
        .user_message()
        .contains("Check connection"));
    }

    #[test]
    fn test_too_large_mentions_ceiling() {
        let msg = Error::from(ValidationError::TooLarge { size: 5 * 1024 * 1024 }).user_message();
        assert!(msg.contains("4MB"));
    }
}
