//! Platform-styled preview of a generated post.

use crate::models::{ImageSource, Platform};
use crate::platform::PlatformTheme;
use serde::Serialize;

pub const CAPTION_PLACEHOLDER: &str = "Caption will appear here...";
pub const COPY_LABEL: &str = "📋 Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const DOWNLOAD_LABEL: &str = "⬇️ Download";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewImage {
    pub url: String,
    pub download_label: &'static str,
}

/// Everything needed to draw the preview card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPreview {
    pub platform: Platform,
    pub title: String,
    pub icon: &'static str,
    pub theme: &'static PlatformTheme,
    pub image: Option<PreviewImage>,
    pub text: String,
    pub char_count: usize,
    pub char_limit: Option<usize>,
    pub over_limit: bool,
    pub can_copy: bool,
}

/// Over limit only when strictly longer than a configured limit.
pub fn is_over_limit(char_count: usize, limit: Option<usize>) -> bool {
    limit.is_some_and(|limit| char_count > limit)
}

/// Characters as the user sees them (Unicode scalar values).
pub fn char_count(content: &str) -> usize {
    content.chars().count()
}

pub fn render(platform: Platform, content: &str, image_url: Option<&ImageSource>) -> PostPreview {
    let config = platform.config();
    let count = char_count(content);

    PostPreview {
        platform,
        title: format!("{} Post Preview", platform),
        icon: config.icon,
        theme: &config.theme,
        image: image_url.map(|source| PreviewImage {
            url: source.to_string(),
            download_label: DOWNLOAD_LABEL,
        }),
        text: if content.is_empty() {
            CAPTION_PLACEHOLDER.to_string()
        } else {
            content.to_string()
        },
        char_count: count,
        char_limit: config.char_limit,
        over_limit: is_over_limit(count, config.char_limit),
        can_copy: !content.is_empty(),
    }
}

impl PostPreview {
    pub fn counter_label(&self) -> String {
        let base = match self.char_limit {
            Some(limit) => format!("Chars: {}/{}", self.char_count, limit),
            None => format!("Chars: {}", self.char_count),
        };
        if self.over_limit {
            format!("{} (Over Limit!)", base)
        } else {
            base
        }
    }

    /// Label for the copy button, if one is shown.
    pub fn copy_label(&self, copied: bool) -> Option<&'static str> {
        match (self.can_copy, copied) {
            (false, _) => None,
            (true, true) => Some(COPIED_LABEL),
            (true, false) => Some(COPY_LABEL),
        }
    }

    /// Plain-text card for terminal output.
    pub fn to_terminal(&self, copied: bool) -> String {
        let rule = "─".repeat(48);
        let mut out = format!("{}\n{} {}\n{}\n", rule, self.icon, self.title, rule);
        if let Some(image) = &self.image {
            out.push_str(&format!("[image] {}  ({})\n\n", image.url, image.download_label));
        }
        out.push_str(&self.text);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&self.counter_label());
        if let Some(label) = self.copy_label(copied) {
            out.push_str("   ");
            out.push_str(label);
        }
        out.push('\n');
        out
    }
}
