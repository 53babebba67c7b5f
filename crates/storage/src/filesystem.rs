//! Filesystem-based photo storage
//!
//! All photos live flat in a single root directory.

use crate::{PhotoId, PhotoStore, StoreError};
use async_trait::async_trait;
use common::file_utils::validate_photo_id;
use common::utils::current_timestamp_nanos;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Extension given to every stored photo
pub const PHOTO_EXTENSION: &str = "jpg";

pub struct FilesystemPhotoStore {
    root: PathBuf,
}

impl FilesystemPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Random token plus creation time in nanoseconds. Neither half alone is
    /// trusted to be unique; together they make collisions practically
    /// impossible, and `save` refuses to overwrite if one happens anyway.
    fn generate_id() -> PhotoId {
        PhotoId(format!(
            "{}:{}.{}",
            Uuid::new_v4(),
            current_timestamp_nanos(),
            PHOTO_EXTENSION
        ))
    }

    /// Map an untrusted id to a path directly inside the root
    fn resolve(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_photo_id(id).map_err(|e| StoreError::InvalidId {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let path = self.root.join(id);
        if path.parent() != Some(self.root.as_path()) {
            return Err(StoreError::InvalidId {
                id: id.to_string(),
                reason: "resolves outside the upload directory".to_string(),
            });
        }
        Ok(path)
    }
}

#[async_trait]
impl PhotoStore for FilesystemPhotoStore {
    async fn save(&self, content: &[u8]) -> Result<PhotoId, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let id = Self::generate_id();
        let path = self.root.join(id.as_str());

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(content).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!(path = ?path, error = %cleanup, "Failed to remove partial photo");
            }
            return Err(StoreError::Storage(e));
        }

        debug!(photo_id = %id, bytes = content.len(), "Stored photo");
        Ok(id)
    }

    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(id)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(StoreError::Storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_save_then_retrieve_returns_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPhotoStore::new(dir.path().join("nested").join("uploads"));

        let content = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        let id = store.save(&content).await.unwrap();

        assert_eq!(store.retrieve(id.as_str()).await.unwrap(), content);
        assert!(store.root().join(id.as_str()).is_file());
    }

    #[tokio::test]
    async fn test_generated_id_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPhotoStore::new(dir.path());
        let id = store.save(b"x").await.unwrap();

        let stem = id.as_str().strip_suffix(".jpg").unwrap();
        let (token, nanos) = stem.split_once(':').unwrap();
        assert!(Uuid::parse_str(token).is_ok());
        assert!(nanos.parse::<u128>().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_save_creates_root_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPhotoStore::new(dir.path().join("uploads"));
        store.save(b"one").await.unwrap();
        store.save(b"two").await.unwrap();
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FilesystemPhotoStore::new(dir.path().join("uploads")));

        let tasks: Vec<_> = (0..64u8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&[i]).await.unwrap() })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            ids.insert(task.await.unwrap());
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 64);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.jpg"), b"secret").unwrap();
        // root does not exist, so any filesystem access would yield NotFound
        let store = FilesystemPhotoStore::new(dir.path().join("uploads"));

        for id in ["../secret.jpg", "/etc/passwd", "..", "a/../../secret.jpg", "..\\secret.jpg", ""] {
            match store.retrieve(id).await {
                Err(StoreError::InvalidId { .. }) => {}
                other => panic!("{:?} should be rejected, got {:?}", id, other),
            }
        }
    }

    #[tokio::test]
    async fn test_missing_photo_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPhotoStore::new(dir.path());
        assert!(matches!(
            store.retrieve("0f8fad5b-d9cb-469f-a165-70867728950e:1.jpg").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
