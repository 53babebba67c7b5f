/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "8080";

/// Default directory for uploaded photos
pub const DEFAULT_DATA_DIR: &str = "uploads";

/// Default VAPID key locations
pub const DEFAULT_VAPID_PRIVATE_KEY: &str = "vapid-keys/vapid_private_key.pem";
pub const DEFAULT_VAPID_PUBLIC_KEY: &str = "vapid-keys/vapid_public_key.pem";

/// Default base URL used to build photo links in notifications
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

/// Default VAPID contact
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:notifications@localhost";

/// Default time the push service keeps an undelivered message (seconds)
pub const DEFAULT_PUSH_TTL_SECONDS: &str = "30";

/// Default timeout for one push request (seconds)
pub const DEFAULT_PUSH_TIMEOUT_SECONDS: &str = "10";

/// Default JSON body limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: &str = "10485760";

/// Sender name used when an upload does not carry one
pub const DEFAULT_SENDER: &str = "Someone";

/// VAPID token lifetime (30 minutes)
pub const VAPID_TOKEN_TTL_SECONDS: u64 = 30 * 60;

/// Longest accepted sender name, in characters. Keeps the notification
/// payload well inside what one push message can carry.
pub const MAX_SENDER_CHARS: usize = 256;
