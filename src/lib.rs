//! Social post generator - drafts platform-tailored captions with AI
//!
//! Takes a text prompt and/or an uploaded image, asks a chat/vision endpoint
//! for a caption sized to the target platform (optionally generating an
//! illustration in parallel), and renders a platform-styled preview that can
//! be copied or downloaded.

pub mod ai;
pub mod clipboard;
pub mod dashboard;
pub mod download;
pub mod error;
pub mod generator;
pub mod image;
pub mod input;
pub mod models;
pub mod platform;
pub mod preview;
pub mod prompts;

pub use error::{Error, Result};
