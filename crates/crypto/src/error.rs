use crate::keys::KeyKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("failed to read VAPID {kind} key from {path:?}: {source}")]
    Io {
        kind: KeyKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no PEM block found in VAPID {0} key")]
    MissingPemBlock(KeyKind),
    #[error("VAPID {kind} key is not a valid P-256 key: {reason}")]
    InvalidKey { kind: KeyKind, reason: String },
    #[error("VAPID public key does not belong to the private key")]
    Mismatch,
}
