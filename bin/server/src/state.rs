//! Server application state

use crate::config::ServerConfig;
use crate::constants::VAPID_TOKEN_TTL_SECONDS;
use anyhow::{Context, Result};
use crypto::KeyMaterial;
use push::{DispatcherConfig, PushDispatcher};
use std::sync::Arc;
use std::time::Duration;
use storage::{FilesystemPhotoStore, PhotoId, PhotoStore, SubscriptionRegistry};

/// Shared by every worker through `web::Data`
pub struct AppState {
    pub photos: Arc<dyn PhotoStore>,
    pub registry: SubscriptionRegistry,
    pub keys: KeyMaterial,
    pub dispatcher: PushDispatcher,
    pub public_url: String,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let dispatcher = PushDispatcher::new(DispatcherConfig {
            subject: config.vapid_subject.clone(),
            ttl_seconds: config.push_ttl_seconds,
            token_ttl: Duration::from_secs(VAPID_TOKEN_TTL_SECONDS),
            timeout: config.push_timeout,
        })
        .context("Failed to build push client")?;

        Ok(Self {
            photos: Arc::new(FilesystemPhotoStore::new(&config.data_dir)),
            registry: SubscriptionRegistry::new(),
            keys: KeyMaterial::new(&config.vapid_private_key, &config.vapid_public_key),
            dispatcher,
            public_url: config.public_url.clone(),
        })
    }

    /// Link recipients follow to fetch a photo
    pub fn photo_url(&self, id: &PhotoId) -> String {
        format!("{}/photo/{}", self.public_url, id)
    }
}
