use crate::constants::PHOTO_ENDPOINT;
use anyhow::{Context, Result};
use common::file_utils;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};

/// Download a stored photo and write it to `output`, or to a file named
/// after the photo in the current directory
pub fn fetch_photo(server: &str, filename: &str, output: Option<&Path>) -> Result<PathBuf> {
    // Refuse names the server would reject anyway, and never write outside the output path
    file_utils::validate_photo_id(filename)
        .map_err(|e| anyhow::anyhow!("{}: {:?}", e.message(), filename))?;

    let url = format!(
        "{}{}{}",
        server.trim_end_matches('/'),
        PHOTO_ENDPOINT,
        filename
    );
    let response = Client::new()
        .get(&url)
        .send()
        .context("Failed to connect to server")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("Download failed: {} - {}", status, error_text);
    }

    let content = response.bytes().context("Failed to read photo")?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(filename));
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(&output_path, &content).context("Failed to write downloaded photo")?;

    info!("Downloaded {} ({} bytes)", filename, content.len());
    println!("✓ Photo saved to: {:?}", output_path);
    Ok(output_path)
}
