//! Clipboard access and the transient "copied" indicator.

use crate::{Error, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// How long the copy button shows its "copied" state.
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_millis(1500);

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

/// In-process clipboard, used when no desktop session is available.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

/// Tracks whether the "copied" indicator is showing. Each successful copy
/// shows it for [`COPY_FEEDBACK_DURATION`] from that copy.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    copied_until: Mutex<Option<Instant>>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&self, clipboard: &dyn Clipboard, text: &str) -> Result<()> {
        clipboard.set_text(text).map_err(|e| {
            tracing::warn!("Could not copy text: {}", e);
            e
        })?;
        *self.copied_until.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Instant::now() + COPY_FEEDBACK_DURATION);
        Ok(())
    }

    pub fn is_copied(&self) -> bool {
        self.copied_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn reset(&self) {
        *self.copied_until.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
