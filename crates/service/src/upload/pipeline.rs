use std::path::PathBuf;
use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::{info, instrument, warn};

use super::{check_file_size, check_image_type, unique_file_name, FileStore, ImagePart, LocalFileStore, UploadError};

/// Output box and subdirectory of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub dir: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const VARIANTS: [Variant; 3] = [
    Variant { dir: "thumb", width: 150, height: 150 },
    Variant { dir: "mid", width: 300, height: 300 },
    Variant { dir: "big", width: 1024, height: 1024 },
];

/// Lossy WebP quality for every variant.
pub const WEBP_QUALITY: f32 = 80.0;

#[derive(Clone)]
pub struct ImagePipeline {
    root: PathBuf,
    max_file_size: u64,
    store: Arc<dyn FileStore>,
}

impl ImagePipeline {
    pub fn new(root: impl Into<PathBuf>, max_file_size: u64, store: Arc<dyn FileStore>) -> Self {
        Self { root: root.into(), max_file_size, store }
    }

    pub fn from_config(cfg: &configs::UploadConfig) -> Self {
        Self::new(&cfg.image_dir, cfg.max_file_size, Arc::new(LocalFileStore))
    }

    pub fn root(&self) -> &std::path::Path { &self.root }

    /// Type and size checks; nothing is decoded or written.
    pub fn validate(&self, part: &ImagePart) -> Result<(), UploadError> {
        let mut errors = check_image_type(part);
        errors.extend(check_file_size(part, self.max_file_size));
        if errors.is_empty() { Ok(()) } else { Err(UploadError::Rejected(errors)) }
    }

    /// Run the whole pipeline and return the bare stored filename.
    ///
    /// All variants are encoded in memory before the first directory is
    /// touched. A write failure midway leaves earlier variants on disk.
    #[instrument(skip(self, part), fields(field = %part.field, file_name = %part.file_name, size = part.bytes.len()))]
    pub async fn process(&self, part: &ImagePart) -> Result<String, UploadError> {
        self.validate(part)?;

        let bytes = part.bytes.clone();
        let content_type = part.content_type.clone();
        let encoded = tokio::task::spawn_blocking(move || render_variants(&bytes, &content_type))
            .await
            .map_err(|e| UploadError::Encode(e.to_string()))??;

        let file_name = unique_file_name(&part.file_name);
        for (variant, data) in VARIANTS.iter().zip(encoded.iter()) {
            let dir = self.root.join(variant.dir);
            self.store.ensure_directory(&dir).await?;
            self.store.write(&dir.join(&file_name), data).await?;
        }
        info!(file_name = %file_name, "upload stored");
        Ok(file_name)
    }

    /// Drop every variant of a stored upload. Failures are logged only.
    pub async fn discard(&self, file_name: &str) {
        for variant in VARIANTS {
            let path = self.root.join(variant.dir).join(file_name);
            if let Err(e) = self.store.remove(&path).await {
                warn!(path = %path.display(), error = %e, "failed to remove upload variant");
            }
        }
    }
}

fn decoder_format(content_type: &str) -> Option<ImageFormat> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpg" => Some(ImageFormat::Jpeg),
        "image/vnd.microsoft.icon" => Some(ImageFormat::Ico),
        other => ImageFormat::from_mime_type(other),
    }
}

pub(crate) fn decode(bytes: &[u8], content_type: &str) -> Result<DynamicImage, UploadError> {
    let directed = decoder_format(content_type).and_then(|f| image::load_from_memory_with_format(bytes, f).ok());
    match directed {
        Some(img) => Ok(img),
        None => image::load_from_memory(bytes).map_err(|e| UploadError::Decode(e.to_string())),
    }
}

fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, UploadError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(UploadError::Encode("empty image".into()));
    }
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode(WEBP_QUALITY);
    Ok(encoded.to_vec())
}

/// Decode once, then fit into each variant box and encode as lossy WebP.
pub(crate) fn render_variants(bytes: &[u8], content_type: &str) -> Result<Vec<Vec<u8>>, UploadError> {
    let img = decode(bytes, content_type)?;
    VARIANTS
        .iter()
        .map(|v| encode_webp(&img.resize(v.width, v.height, FilterType::Lanczos3)))
        .collect()
}
