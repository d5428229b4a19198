//! Image upload handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use shared::types::HostedImage;

use crate::error::{AppError, AppResult};
use crate::external::ImageUpload;
use crate::middleware::CurrentUser;
use crate::services::MediaService;
use crate::AppState;

/// What the browser needs for direct unsigned uploads
#[derive(Serialize)]
pub struct MediaConfigResponse {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    pub signed_uploads: bool,
}

/// Upload the multipart `file` field to image hosting
pub async fn upload_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<HostedImage>)> {
    let bad_upload = |e: axum::extract::multipart::MultipartError| AppError::validation("file", e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_upload)?;

        let image = MediaService::new(state.images.clone())
            .upload(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            })
            .await?;

        tracing::info!("{} uploaded image {}", current_user.0.email, image.public_id);
        return Ok((StatusCode::CREATED, Json(image)));
    }

    Err(AppError::validation("file", "Attach the image as a 'file' field"))
}

pub async fn media_config(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Json<MediaConfigResponse> {
    let cloudinary = &state.config.cloudinary;
    Json(MediaConfigResponse {
        cloud_name: cloudinary.cloud_name.clone(),
        upload_preset: cloudinary.upload_preset.clone(),
        folder: cloudinary.folder.clone(),
        signed_uploads: cloudinary.has_credentials(),
    })
}
