//! External API integrations

use async_trait::async_trait;

use shared::types::HostedImage;

use crate::error::AppResult;

pub mod cloudinary;

pub use cloudinary::CloudinaryClient;

/// A file received from the admin UI
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Hosted image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, upload: ImageUpload) -> AppResult<HostedImage>;

    /// Delete the image served at `url`
    async fn delete(&self, url: &str) -> AppResult<()>;
}
