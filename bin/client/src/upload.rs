use crate::constants::SEND_PHOTO_ENDPOINT;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::{RecipientId, UploadRequest, UploadResponse};
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;

/// Handles photo uploads to the server
pub struct PhotoUploader {
    server: String,
    client: Client,
}

impl PhotoUploader {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Upload the photo at `path` and ask the server to notify `recipients`
    pub fn send_photo(
        &self,
        path: &Path,
        recipients: Vec<RecipientId>,
        from: Option<String>,
    ) -> Result<UploadResponse> {
        let content =
            fs::read(path).with_context(|| format!("Failed to read photo: {:?}", path))?;
        anyhow::ensure!(!content.is_empty(), "Photo {:?} is empty", path);

        info!(
            "Uploading {:?} ({} bytes) to {} recipient(s)",
            path,
            content.len(),
            recipients.len()
        );

        let request = build_upload_request(path, &content, recipients, from);
        let url = format!("{}{}", self.server, SEND_PHOTO_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .context("Failed to connect to server")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Upload failed: {} - {}", status, error_text);
        }

        let result: UploadResponse = response.json().context("Invalid upload response")?;
        info!("Uploaded photo as {}", result.filename);
        Ok(result)
    }
}

/// Build the JSON body the way a browser sends it: a data URL
fn build_upload_request(
    path: &Path,
    content: &[u8],
    recipients: Vec<RecipientId>,
    from: Option<String>,
) -> UploadRequest {
    UploadRequest {
        image: format!("data:{};base64,{}", mime_type(path), STANDARD.encode(content)),
        recipients,
        from,
    }
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Upload a photo (convenience function)
pub fn send_photo(
    server: &str,
    file: &Path,
    recipients: Vec<RecipientId>,
    from: Option<String>,
) -> Result<UploadResponse> {
    PhotoUploader::new(server).send_photo(file, recipients, from)
}
