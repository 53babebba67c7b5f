//! VAPID key material (RFC 8292)
//!
//! Keys are read from two PEM files: the private key as SEC1
//! (`EC PRIVATE KEY`, as written by `openssl ecparam -genkey`) or PKCS#8
//! (`PRIVATE KEY`), and the public key as SPKI (`PUBLIC KEY`). Both are
//! decoded to the raw forms Web Push works with: the 32-byte scalar and the
//! 65-byte uncompressed point.

use crate::error::KeyLoadError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use once_cell::sync::OnceCell;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Length of the uncompressed public point
pub const PUBLIC_KEY_LEN: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Private,
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Private => f.write_str("private"),
            KeyKind::Public => f.write_str("public"),
        }
    }
}

/// P-256 key pair identifying this server to push services
#[derive(Clone)]
pub struct VapidKeyPair {
    secret: SecretKey,
    public_key: Vec<u8>,
    public_key_b64: String,
}

impl VapidKeyPair {
    /// Read and decode both PEM files
    pub fn load(private_key_path: &Path, public_key_path: &Path) -> Result<Self, KeyLoadError> {
        let private_pem = read_key_file(KeyKind::Private, private_key_path)?;
        let public_pem = read_key_file(KeyKind::Public, public_key_path)?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Decode a key pair from PEM text, checking that both halves match
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyLoadError> {
        let secret = parse_private_pem(private_pem)?;

        let public_block = extract_pem_block(public_pem, "PUBLIC KEY")
            .ok_or(KeyLoadError::MissingPemBlock(KeyKind::Public))?;
        let public = PublicKey::from_public_key_pem(&public_block).map_err(|e| {
            KeyLoadError::InvalidKey {
                kind: KeyKind::Public,
                reason: e.to_string(),
            }
        })?;

        if secret.public_key() != public {
            return Err(KeyLoadError::Mismatch);
        }

        Ok(Self::from_secret(secret))
    }

    /// Generate a fresh key pair
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::random(&mut OsRng))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public_key = secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();
        let public_key_b64 = URL_SAFE_NO_PAD.encode(&public_key);
        Self {
            secret,
            public_key,
            public_key_b64,
        }
    }

    /// Uncompressed public point (`0x04 || x || y`)
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public_key
    }

    /// Public key as browsers expect it for `applicationServerKey`
    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    /// Raw 32-byte private scalar, base64url without padding. This is the
    /// form `web_push::VapidSignatureBuilder::from_base64` signs with.
    pub fn private_key_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.secret.to_bytes())
    }

    /// Encode as `(SEC1 private PEM, SPKI public PEM)`, the formats `load` reads
    pub fn to_pem(&self) -> Result<(String, String), KeyLoadError> {
        let private_pem = self
            .secret
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| KeyLoadError::InvalidKey {
                kind: KeyKind::Private,
                reason: e.to_string(),
            })?;
        let public_pem = self
            .secret
            .public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyLoadError::InvalidKey {
                kind: KeyKind::Public,
                reason: e.to_string(),
            })?;
        Ok((private_pem.to_string(), public_pem))
    }

    /// Write both PEM files, creating parent directories.
    /// The private key file is only readable by its owner on Unix.
    pub fn write_pem_files(
        &self,
        private_key_path: &Path,
        public_key_path: &Path,
    ) -> std::io::Result<()> {
        let (private_pem, public_pem) = self
            .to_pem()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        for path in [private_key_path, public_key_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
            .open(private_key_path)?
            .write_all(private_pem.as_bytes())?;

        fs::write(public_key_path, public_pem)
    }
}

impl fmt::Debug for VapidKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeyPair")
            .field("public_key", &self.public_key_b64)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Loads the VAPID key pair on first use and hands out the cached pair after.
///
/// Concurrent first callers block until the single load finishes. A failed
/// load is not cached, so the next call reads the files again.
#[derive(Debug)]
pub struct KeyMaterial {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    keys: OnceCell<VapidKeyPair>,
}

impl KeyMaterial {
    pub fn new(private_key_path: impl Into<PathBuf>, public_key_path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: public_key_path.into(),
            keys: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&VapidKeyPair, KeyLoadError> {
        self.keys
            .get_or_try_init(|| VapidKeyPair::load(&self.private_key_path, &self.public_key_path))
    }
}

fn read_key_file(kind: KeyKind, path: &Path) -> Result<String, KeyLoadError> {
    fs::read_to_string(path).map_err(|source| KeyLoadError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn parse_private_pem(pem: &str) -> Result<SecretKey, KeyLoadError> {
    let invalid = |reason: String| KeyLoadError::InvalidKey {
        kind: KeyKind::Private,
        reason,
    };

    if let Some(block) = extract_pem_block(pem, "EC PRIVATE KEY") {
        SecretKey::from_sec1_pem(&block).map_err(|e| invalid(e.to_string()))
    } else if let Some(block) = extract_pem_block(pem, "PRIVATE KEY") {
        SecretKey::from_pkcs8_pem(&block).map_err(|e| invalid(e.to_string()))
    } else {
        Err(KeyLoadError::MissingPemBlock(KeyKind::Private))
    }
}

/// Cut the first `label` block out of `text`.
///
/// `openssl ecparam -genkey` writes an `EC PARAMETERS` block ahead of the
/// key unless `-noout` is given; the decoders only accept a single block.
fn extract_pem_block(text: &str, label: &str) -> Option<String> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);
    let start = text.find(&begin)?;
    let stop = start + text[start..].find(&end)? + end.len();
    Some(format!("{}\n", &text[start..stop]))
}
