//! Local store for uploaded equation photos.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::mime_detect::extension_for_mime;

/// Default cap on uploaded image size.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepts validated image bytes, writes them under the media directory as
/// `<uuid>.<ext>`, and hands back the generated filename for URL
/// construction.
#[derive(Clone)]
pub struct ImageStore {
    media_dir: PathBuf,
    max_bytes: usize,
}

/// A persisted upload.
#[derive(Debug)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
}

impl ImageStore {
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and persist an uploaded image.
    pub async fn save(&self, bytes: &[u8], content_type: &str) -> Result<StoredImage> {
        if bytes.is_empty() {
            bail!("upload is empty");
        }
        if bytes.len() > self.max_bytes {
            bail!("upload exceeds the {} byte limit", self.max_bytes);
        }
        let Some(ext) = extension_for_mime(content_type) else {
            bail!("unsupported content type: {content_type}");
        };

        fs::create_dir_all(&self.media_dir)
            .await
            .context("Failed to create media directory")?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.media_dir.join(&filename);
        fs::write(&path, bytes)
            .await
            .context("Failed to write uploaded image")?;

        info!(filename = %filename, size_bytes = bytes.len(), "Stored uploaded image");
        Ok(StoredImage { filename, path })
    }
}

/// Inline `data:` URL for forwarding an image to the model without a
/// publicly reachable address.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
