//! Disk storage for uploaded images.
//!
//! Filenames are fully server-generated (upload-time millis plus a random
//! suffix, extension taken from the sniffed format), so client input never
//! reaches the filesystem path. Stored files are served back verbatim under
//! `/uploads/`; deleting a photo record does NOT remove its file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::ServerError;

/// Stores uploaded images under a flat directory and hands back their
/// public `/uploads/...` path.
pub struct MediaStore {
    base_path: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    pub async fn new(base_path: PathBuf, max_bytes: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Internal(format!(
                "Failed to create uploads directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Media store initialized");

        Ok(Self {
            base_path,
            max_bytes,
        })
    }

    #[allow(dead_code)]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Bound, sniff and write an uploaded image.
    ///
    /// The content type is decided from magic bytes, never from headers or
    /// the client filename. Returns the public path of the stored file.
    pub async fn store_image(&self, data: &[u8]) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::InvalidArgument("empty image upload".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(ServerError::PayloadTooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let format = image::guess_format(data).map_err(|_| ServerError::UnsupportedMediaType)?;
        let ext = format.extensions_str().first().copied().unwrap_or("img");

        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::random();
        let filename = format!("{millis}-{suffix:08x}.{ext}");

        let path = self.base_path.join(&filename);
        fs::write(&path, data).await.map_err(|e| {
            ServerError::Internal(format!("Failed to write image {filename}: {e}"))
        })?;

        debug!(file = %filename, size = data.len(), "Stored uploaded image");
        Ok(format!("/uploads/{filename}"))
    }
}
