//! VAPID key material for Web Push: PEM loading, generation and the cached
//! process-wide key pair.

pub mod error;
pub mod keys;

pub use error::KeyLoadError;
pub use keys::{KeyKind, KeyMaterial, VapidKeyPair};
