//! Image upload pipeline: validate, decode, resize to three variants,
//! re-encode and persist under one generated filename.

pub mod pipeline;
pub mod store;

use std::path::Path;

use thiserror::Error;

use crate::validation::FieldError;

pub use pipeline::{ImagePipeline, Variant, VARIANTS, WEBP_QUALITY};
pub use store::{FileStore, LocalFileStore};

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "ico"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload rejected")]
    Rejected(Vec<FieldError>),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("failed to store upload: {0}")]
    Io(String),
}

/// One file part of a multipart form.
#[derive(Debug, Clone)]
pub struct ImagePart {
    /// Form field name, used in validation messages.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn extension_of(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|e| e.to_str())
}

/// Content type and extension must both be on the allow-list.
pub fn check_image_type(part: &ImagePart) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let ct = part.content_type.trim().to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&ct.as_str()) {
        errors.push(FieldError::new(
            &part.field,
            format!("file type not allowed: {}. Only images are allowed", part.content_type),
        ));
    }
    let ext = extension_of(&part.file_name).map(str::to_ascii_lowercase);
    if !ext.as_deref().map(|e| ALLOWED_EXTENSIONS.contains(&e)).unwrap_or(false) {
        errors.push(FieldError::new(
            &part.field,
            format!("file extension not allowed: {}", ext.map(|e| format!(".{}", e)).unwrap_or_default()),
        ));
    }
    errors
}

pub fn check_file_size(part: &ImagePart, max_bytes: u64) -> Option<FieldError> {
    (part.bytes.len() as u64 > max_bytes).then(|| {
        FieldError::new(&part.field, format!("file size exceeds {} bytes", max_bytes))
    })
}

/// `<stem>_<unix nanos><.ext>`; stem characters outside `[A-Za-z0-9_-]` become `_`.
pub fn unique_file_name(original: &str) -> String {
    let (stem, ext) = match original.rfind('.') {
        Some(i) => original.split_at(i),
        None => (original, ""),
    };
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}_{}{}", stem, nanos, ext)
}
