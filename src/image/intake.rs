use super::mime::{detect_image_mime, mime_from_extension};
use crate::error::ValidationError;
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;
use std::sync::Arc;

/// Upload ceiling accepted by the vision endpoint.
pub const MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// A file picked by the user, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: Option<String>,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: Option<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name,
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, sniffing its type from content and falling
    /// back to the extension. Files over [`MAX_UPLOAD_BYTES`] are rejected
    /// from their metadata without being read.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            tracing::warn!(
                "Rejected upload {} of {} bytes (max {})",
                path.display(),
                size,
                MAX_UPLOAD_BYTES
            );
            return Err(ValidationError::TooLarge { size }.into());
        }

        let bytes = tokio::fs::read(path).await?;
        let mime = detect_image_mime(&bytes)
            .or_else(|| mime_from_extension(path))
            .unwrap_or("application/octet-stream");
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        tracing::debug!(
            "Read upload {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime
        );

        Ok(Self::new(name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// An upload that passed type and size checks. Bytes are shared, so clones
/// are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    name: Option<String>,
    mime: String,
    bytes: Arc<Vec<u8>>,
}

impl ValidatedImage {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 payload for the vision endpoint. Encoding runs off the async
    /// executor; the caller resumes once it finishes.
    pub async fn encode_base64(&self) -> Result<String> {
        let bytes = Arc::clone(&self.bytes);
        tokio::task::spawn_blocking(move || {
            base64::engine::general_purpose::STANDARD.encode(bytes.as_slice())
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(format!("Encoding task failed: {}", e))))
    }

    /// `data:` URL embedding the image inline.
    pub async fn data_url(&self) -> Result<String> {
        let encoded = self.encode_base64().await?;
        Ok(format!("data:{};base64,{}", self.mime, encoded))
    }
}

/// Check an upload's type and size.
pub fn validate(file: UploadedFile) -> std::result::Result<ValidatedImage, ValidationError> {
    let mime = file.mime.trim().to_ascii_lowercase();
    if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        tracing::warn!("Rejected upload with type {}", file.mime);
        return Err(ValidationError::InvalidType { mime: file.mime });
    }

    let size = file.size();
    if size > MAX_UPLOAD_BYTES {
        tracing::warn!("Rejected upload of {} bytes (max {})", size, MAX_UPLOAD_BYTES);
        return Err(ValidationError::TooLarge { size });
    }

    Ok(ValidatedImage {
        name: file.name,
        mime,
        bytes: Arc::new(file.bytes),
    })
}
