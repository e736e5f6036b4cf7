//! Image intake for uploaded files
//!
//! Validates uploads (type, 4 MiB ceiling), keeps a scoped local preview of
//! the accepted file, and encodes it for inline transport to the vision
//! endpoint.

pub mod handle;
pub mod intake;
pub mod mime;

pub use handle::{PreviewHandle, PreviewRegistry};
pub use intake::{validate, UploadedFile, ValidatedImage, MAX_UPLOAD_BYTES};
