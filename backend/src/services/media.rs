//! Image uploads and best-effort cleanup of replaced images

use std::sync::Arc;

use shared::types::HostedImage;

use crate::error::{AppError, AppResult};
use crate::external::{ImageStore, ImageUpload};

/// Largest accepted upload
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct MediaService {
    images: Arc<dyn ImageStore>,
}

impl MediaService {
    pub fn new(images: Arc<dyn ImageStore>) -> Self {
        Self { images }
    }

    pub async fn upload(&self, upload: ImageUpload) -> AppResult<HostedImage> {
        if upload.bytes.is_empty() {
            return Err(AppError::validation("file", "The uploaded file is empty"));
        }
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::validation("file", "Images must be 10 MB or smaller"));
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(AppError::validation("file", "Only image files can be uploaded"));
            }
        }

        self.images.upload(upload).await
    }

    /// Delete a hosted image. Failures are logged and swallowed.
    pub async fn discard(&self, url: Option<&str>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return;
        };
        if let Err(e) = self.images.delete(url).await {
            tracing::warn!("Could not delete image {}: {}", url, e);
        }
    }

    /// Discard `old` when a record's image changed from it
    pub async fn discard_replaced(&self, old: Option<&str>, new: Option<&str>) {
        if old != new {
            self.discard(old).await;
        }
    }
}
