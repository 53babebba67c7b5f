/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default directory for generated VAPID keys
pub const DEFAULT_KEY_DIR: &str = "vapid-keys";

/// VAPID key filenames, as the server expects them by default
pub const PRIVATE_KEY_FILE: &str = "vapid_private_key.pem";
pub const PUBLIC_KEY_FILE: &str = "vapid_public_key.pem";

/// Photo upload endpoint path
pub const SEND_PHOTO_ENDPOINT: &str = "/send-photo";

/// Subscription endpoint path
pub const SUBSCRIBE_ENDPOINT: &str = "/subscribe";

/// Photo download endpoint path (followed by the filename)
pub const PHOTO_ENDPOINT: &str = "/photo/";

/// VAPID public key endpoint path
pub const VAPID_PUBLIC_KEY_ENDPOINT: &str = "/vapid-public-key";
