use crate::constants::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use anyhow::{Context, Result};
use crypto::VapidKeyPair;
use log::info;
use std::path::{Path, PathBuf};

/// Paths of the two PEM files inside `out_dir`
pub fn key_paths(out_dir: &Path) -> (PathBuf, PathBuf) {
    (out_dir.join(PRIVATE_KEY_FILE), out_dir.join(PUBLIC_KEY_FILE))
}

/// Generate a VAPID key pair and write it where the server looks for it.
/// Returns the public key, base64url encoded.
pub fn generate_vapid_keys(out_dir: &Path, force: bool) -> Result<String> {
    let (private_path, public_path) = key_paths(out_dir);

    if !force {
        for path in [&private_path, &public_path] {
            if path.exists() {
                anyhow::bail!(
                    "VAPID key already exists at {:?}. Use --force to overwrite it.",
                    path
                );
            }
        }
    }

    let keys = VapidKeyPair::generate();
    keys.write_pem_files(&private_path, &public_path)
        .with_context(|| format!("Failed to write VAPID keys to {:?}", out_dir))?;

    // Read back through the same loader the server uses
    let loaded = VapidKeyPair::load(&private_path, &public_path)
        .context("Generated VAPID keys could not be loaded back")?;
    anyhow::ensure!(
        loaded.public_key_bytes() == keys.public_key_bytes(),
        "Generated VAPID keys did not round-trip"
    );

    info!("Generated VAPID keys in {:?}", out_dir);
    println!("✓ VAPID keys generated successfully");
    println!("Private key: {:?}", private_path);
    println!("Public key:  {:?}", public_path);
    println!("Application server key: {}", keys.public_key_base64url());

    if force {
        println!("⚠️  Warning: Existing keys were overwritten. Browsers must subscribe again.");
    }

    Ok(keys.public_key_base64url().to_string())
}
