//! User input held by the dashboard and the request snapshot built from it.
//!
//! An attached upload and the want-image flag are mutually exclusive; both
//! [`InputState`] and [`GenerationRequest::new`] enforce it.

use crate::error::ValidationError;
use crate::image::{validate, PreviewHandle, PreviewRegistry, UploadedFile, ValidatedImage};
use crate::models::{Platform, PostStyle, PreviewRef};

/// An upload plus the reference to its live preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestImage {
    pub image: ValidatedImage,
    pub preview: PreviewRef,
}

/// Immutable snapshot of the input for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    platform: Platform,
    style: PostStyle,
    image: Option<RequestImage>,
    want_image: bool,
}

impl GenerationRequest {
    /// `want_image` is ignored when an image is supplied.
    pub fn new(
        prompt: impl Into<String>,
        platform: Platform,
        style: PostStyle,
        image: Option<RequestImage>,
        want_image: bool,
    ) -> Self {
        let want_image = want_image && image.is_none();
        Self {
            prompt: prompt.into(),
            platform,
            style,
            image,
            want_image,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn style(&self) -> PostStyle {
        self.style
    }

    pub fn image(&self) -> Option<&RequestImage> {
        self.image.as_ref()
    }

    pub fn want_image(&self) -> bool {
        self.want_image
    }

    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}

struct AttachedImage {
    image: ValidatedImage,
    preview: PreviewHandle,
}

/// Editable input owned by the dashboard.
pub struct InputState {
    prompt: String,
    platform: Platform,
    style: PostStyle,
    want_image: bool,
    attached: Option<AttachedImage>,
    registry: PreviewRegistry,
}

impl InputState {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            prompt: String::new(),
            platform: Platform::LinkedIn,
            style: PostStyle::Personal,
            want_image: false,
            attached: None,
            registry,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub fn style(&self) -> PostStyle {
        self.style
    }

    pub fn set_style(&mut self, style: PostStyle) {
        self.style = style;
    }

    pub fn want_image(&self) -> bool {
        self.want_image
    }

    /// Returns the effective flag, which stays false while an image is
    /// attached.
    pub fn set_want_image(&mut self, want_image: bool) -> bool {
        self.want_image = want_image && self.attached.is_none();
        self.want_image
    }

    pub fn attached_image(&self) -> Option<&ValidatedImage> {
        self.attached.as_ref().map(|a| &a.image)
    }

    pub fn preview_ref(&self) -> Option<PreviewRef> {
        self.attached.as_ref().map(|a| a.preview.reference())
    }

    /// Validate and attach an upload, superseding any previous one. A
    /// rejected file also detaches the previous upload.
    pub fn attach_image(&mut self, file: UploadedFile) -> Result<PreviewRef, ValidationError> {
        match validate(file) {
            Ok(image) => {
                let preview = self.registry.create(&image);
                let reference = preview.reference();
                self.attached = Some(AttachedImage { image, preview });
                self.want_image = false;
                Ok(reference)
            }
            Err(e) => {
                self.attached = None;
                Err(e)
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.attached = None;
    }

    /// Snapshot the input, rejecting it when there is neither a prompt nor an
    /// upload.
    pub fn to_request(&self) -> Result<GenerationRequest, ValidationError> {
        if self.prompt.trim().is_empty() && self.attached.is_none() {
            return Err(ValidationError::EmptyInput);
        }

        let image = self.attached.as_ref().map(|a| RequestImage {
            image: a.image.clone(),
            preview: a.preview.reference(),
        });

        Ok(GenerationRequest::new(
            self.prompt.clone(),
            self.platform,
            self.style,
            image,
            self.want_image,
        ))
    }
}
