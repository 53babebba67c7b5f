pub mod filesystem;
pub mod registry;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use filesystem::FilesystemPhotoStore;
pub use registry::SubscriptionRegistry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid photo id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },
    #[error("photo {0} not found")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

/// Generated name of one stored upload: `<uuid>:<unix-nanos>.jpg`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backend for uploaded photos
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist `content` under a freshly generated id
    async fn save(&self, content: &[u8]) -> Result<PhotoId, StoreError>;

    /// Read a photo back.
    /// `id` is untrusted input and is validated before any filesystem access.
    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, StoreError>;
}
