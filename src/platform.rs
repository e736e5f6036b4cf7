//! Static per-platform configuration: character limits, preview themes,
//! icons, and the derived caption token budget.

use crate::models::Platform;
use serde::Serialize;

/// Upper bound on `max_tokens` for any caption request.
pub const MAX_CAPTION_TOKENS: u32 = 500;

/// Colors and sizing for a platform's preview card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformTheme {
    pub background: &'static str,
    pub border: Option<&'static str>,
    pub icon_color: &'static str,
    pub text_color: &'static str,
    pub max_width: &'static str,
    pub max_height: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformConfig {
    pub char_limit: Option<usize>,
    pub icon: &'static str,
    pub theme: PlatformTheme,
}

const BORDER: &str = "1px solid #dee2e6";
const TEXT_DARK: &str = "#343A40";
const WHITE: &str = "#ffffff";

static TWITTER: PlatformConfig = PlatformConfig {
    char_limit: Some(280),
    icon: "🐦",
    theme: PlatformTheme {
        background: "#F6F8FA",
        border: Some(BORDER),
        icon_color: "#1DA1F2",
        text_color: TEXT_DARK,
        max_width: "550px",
        max_height: "600px",
    },
};

static INSTAGRAM: PlatformConfig = PlatformConfig {
    char_limit: Some(2200),
    icon: "📸",
    theme: PlatformTheme {
        background: "linear-gradient(135deg, #FFDC80, #F56040, #C13584)",
        border: None,
        icon_color: WHITE,
        text_color: WHITE,
        max_width: "500px",
        max_height: "800px",
    },
};

static LINKEDIN: PlatformConfig = PlatformConfig {
    char_limit: Some(1300),
    icon: "💼",
    theme: PlatformTheme {
        background: WHITE,
        border: Some(BORDER),
        icon_color: "#0A66C2",
        text_color: TEXT_DARK,
        max_width: "600px",
        max_height: "700px",
    },
};

static FACEBOOK: PlatformConfig = PlatformConfig {
    char_limit: Some(63206),
    icon: "👥",
    theme: PlatformTheme {
        background: "#F0F2F5",
        border: Some(BORDER),
        icon_color: "#1877F2",
        text_color: TEXT_DARK,
        max_width: "550px",
        max_height: "700px",
    },
};

impl Platform {
    pub fn config(self) -> &'static PlatformConfig {
        match self {
            Platform::Twitter => &TWITTER,
            Platform::Instagram => &INSTAGRAM,
            Platform::LinkedIn => &LINKEDIN,
            Platform::Facebook => &FACEBOOK,
        }
    }

    pub fn char_limit(self) -> Option<usize> {
        self.config().char_limit
    }

    /// Platform name plus its length hint, e.g. `LinkedIn (~1300 chars)`.
    pub fn length_hint(self) -> String {
        match self.char_limit() {
            Some(limit) => format!("{} (~{} chars)", self, limit),
            None => self.to_string(),
        }
    }

    /// Extra phrasing appended to image-generation prompts.
    pub fn image_qualifier(self) -> Option<&'static str> {
        match self {
            Platform::Instagram => Some("vibrant colors, high detail"),
            Platform::LinkedIn => Some("professional setting, clean aesthetic"),
            Platform::Twitter | Platform::Facebook => None,
        }
    }
}

pub fn token_budget_for_limit(limit: Option<usize>) -> u32 {
    match limit {
        Some(limit) => {
            let budget = u32::try_from(limit.saturating_add(50)).unwrap_or(u32::MAX);
            budget.min(MAX_CAPTION_TOKENS)
        }
        None => MAX_CAPTION_TOKENS,
    }
}

/// `max_tokens` sent with every caption request for `platform`.
pub fn caption_token_budget(platform: Platform) -> u32 {
    token_budget_for_limit(platform.char_limit())
}
