//! Data models and structures
//!
//! Defines the platform/style selections, the generated post, and the
//! environment-provided endpoint configuration.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Instagram,
    LinkedIn,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::Facebook,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Instagram => "Instagram",
            Platform::LinkedIn => "LinkedIn",
            Platform::Facebook => "Facebook",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown platform '{}'. Expected one of: Twitter, Instagram, LinkedIn, Facebook",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStyle {
    Personal,
    Engagement,
    Informative,
    Promotional,
    Advertisement,
    Announcement,
    Meme,
}

impl PostStyle {
    pub const ALL: [PostStyle; 7] = [
        PostStyle::Personal,
        PostStyle::Engagement,
        PostStyle::Informative,
        PostStyle::Promotional,
        PostStyle::Advertisement,
        PostStyle::Announcement,
        PostStyle::Meme,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PostStyle::Personal => "Personal",
            PostStyle::Engagement => "Engagement",
            PostStyle::Informative => "Informative",
            PostStyle::Promotional => "Promotional",
            PostStyle::Advertisement => "Advertisement",
            PostStyle::Announcement => "Announcement",
            PostStyle::Meme => "Meme",
        }
    }
}

impl fmt::Display for PostStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PostStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown post style '{}'", s))
    }
}

/// Opaque reference to a locally held image preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewRef(Uuid);

impl PreviewRef {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Where the image attached to a generated post lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// The user's own upload, owned by the input collector.
    Preview(PreviewRef),
    /// URL returned by the image-generation endpoint.
    Remote(String),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Preview(reference) => reference.fmt(f),
            ImageSource::Remote(url) => f.write_str(url),
        }
    }
}

impl Serialize for ImageSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPost {
    pub content: String,
    pub image_url: Option<ImageSource>,
}

impl GeneratedPost {
    pub fn new(content: String, image_url: Option<ImageSource>) -> Self {
        Self { content, image_url }
    }
}

// Configuration
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Endpoint/key pairs for both services. A pair is absent when either half
/// is unset or blank; the generator rejects requests that need it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub caption: Option<EndpointConfig>,
    pub image: Option<EndpointConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pair = |url_key: &str, key_key: &str| {
            let url = lookup(url_key).filter(|v| !v.trim().is_empty());
            let api_key = lookup(key_key).filter(|v| !v.trim().is_empty());
            tracing::info!(
                "{}: {}, {}: {}",
                url_key,
                if url.is_some() { "loaded" } else { "MISSING" },
                key_key,
                if api_key.is_some() { "loaded" } else { "MISSING" },
            );
            match (url, api_key) {
                (Some(url), Some(api_key)) => Some(EndpointConfig { url, api_key }),
                _ => None,
            }
        };

        Self {
            caption: pair("GPT4_ENDPOINT", "AZURE_GPT4_API_KEY"),
            image: pair("DALLE_ENDPOINT", "AZURE_DALLE_API_KEY"),
        }
    }
}
