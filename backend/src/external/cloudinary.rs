//! Cloudinary client for product, category and content images
//!
//! Uploads are signed when an API key and secret are configured and fall
//! back to the unsigned upload preset otherwise. Deletes always need the
//! signed `destroy` call.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use shared::types::HostedImage;

use super::{ImageStore, ImageUpload};
use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.config.api_key, &self.config.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some((key.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }

    async fn read_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        AppError::ImageHosting(format!("{} - {}", status, message))
    }
}

/// `key=value` pairs sorted by key and joined with `&`, followed by the secret
pub fn signing_payload(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}", joined, api_secret)
}

/// Hex SHA-256 request signature
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    format!("{:x}", Sha256::digest(signing_payload(params, api_secret).as_bytes()))
}

/// Public id of a delivery URL such as
/// `https://res.cloudinary.com/demo/image/upload/v1712/bakery/ube.jpg` -> `bakery/ube`
pub fn public_id_from_url(url: &str) -> Option<String> {
    let (_, path) = url.split_once("/upload/")?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let start = segments
        .iter()
        .position(|s| is_version_segment(s))
        .map_or(0, |i| i + 1);
    let rest = &segments[start..];
    let (last, dirs) = rest.split_last()?;

    let stem = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => *last,
    };
    let mut parts: Vec<&str> = dirs.to_vec();
    parts.push(stem);
    Some(parts.join("/"))
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

#[async_trait]
impl ImageStore for CloudinaryClient {
    async fn upload(&self, upload: ImageUpload) -> AppResult<HostedImage> {
        if self.config.cloud_name.is_empty() {
            return Err(AppError::Configuration(
                "cloudinary.cloud_name is not set".to_string(),
            ));
        }

        let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::validation("file", format!("Invalid content type: {}", e)))?;
        }

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("folder", self.config.folder.clone());

        form = match self.credentials() {
            Some((api_key, api_secret)) => {
                let timestamp = Utc::now().timestamp().to_string();
                let signature = sign(
                    &[
                        ("folder", self.config.folder.clone()),
                        ("timestamp", timestamp.clone()),
                    ],
                    api_secret,
                );
                form.text("api_key", api_key.to_string())
                    .text("timestamp", timestamp)
                    .text("signature", signature)
                    .text("signature_algorithm", "sha256")
            }
            None => form.text("upload_preset", self.config.upload_preset.clone()),
        };

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ImageHosting(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let data: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::ImageHosting(format!("Failed to parse upload response: {}", e)))?;

        tracing::info!("Uploaded image {}", data.public_id);
        Ok(HostedImage {
            url: data.secure_url,
            public_id: data.public_id,
        })
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        let public_id = public_id_from_url(url)
            .ok_or_else(|| AppError::ImageHosting(format!("Not a hosted image URL: {}", url)))?;
        let (api_key, api_secret) = self.credentials().ok_or_else(|| {
            AppError::Configuration("Deleting images requires an API key and secret".to_string())
        })?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id.clone()), ("timestamp", timestamp.clone())],
            api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", api_key),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ImageHosting(format!("Destroy request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let data: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::ImageHosting(format!("Failed to parse destroy response: {}", e)))?;

        if data.result != "ok" {
            return Err(AppError::ImageHosting(format!(
                "Destroy of {} returned '{}'",
                public_id, data.result
            )));
        }

        tracing::info!("Deleted image {}", public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712345678/bakery-admin/ube-bilao.jpg"
            )
            .as_deref(),
            Some("bakery-admin/ube-bilao")
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/cassava.png?x=1").as_deref(),
            Some("cassava")
        );
        assert_eq!(public_id_from_url("https://example.com/images/ube.jpg"), None);
    }

    #[test]
    fn test_signing_payload_sorted() {
        let payload = signing_payload(
            &[
                ("timestamp", "1700000000".to_string()),
                ("folder", "bakery".to_string()),
                ("public_id", String::new()),
            ],
            "secret",
        );
        assert_eq!(payload, "folder=bakery&timestamp=1700000000secret");
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let signature = sign(&[("timestamp", "1".to_string())], "secret");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(signature, sign(&[("timestamp", "1".to_string())], "secret"));
    }
}
