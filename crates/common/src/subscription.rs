//! Browser push subscriptions: wire shape and validated form

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Length of an uncompressed SEC1 P-256 point
pub const P256DH_KEY_LEN: usize = 65;

/// Length of the subscription auth secret
pub const AUTH_SECRET_LEN: usize = 16;

/// Malformed client input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid {field}: {reason}")]
    InvalidKey { field: &'static str, reason: String },
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("sender name is {len} characters, the limit is {max}")]
    SenderTooLong { len: usize, max: usize },
}

/// Push subscription as produced by `PushManager.subscribe()` in the browser
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub keys: SubscriptionKeys,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SubscriptionKeys {
    #[serde(default)]
    pub p256dh: String, // base64url
    #[serde(default)]
    pub auth: String, // base64url
}

/// A validated push subscription.
///
/// Can only be built through [`TryFrom<SubscriptionRequest>`], so holders know
/// the endpoint parses and both keys have the sizes RFC 8291 requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushSubscription {
    endpoint: Url,
    p256dh: Vec<u8>,
    auth: Vec<u8>,
}

impl PushSubscription {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Subscriber's uncompressed P-256 public key
    pub fn p256dh(&self) -> &[u8] {
        &self.p256dh
    }

    pub fn auth(&self) -> &[u8] {
        &self.auth
    }
}

impl TryFrom<SubscriptionRequest> for PushSubscription {
    type Error = ValidationError;

    fn try_from(req: SubscriptionRequest) -> Result<Self, Self::Error> {
        if req.endpoint.trim().is_empty() {
            return Err(ValidationError::MissingField("endpoint"));
        }
        if req.keys.p256dh.trim().is_empty() {
            return Err(ValidationError::MissingField("keys.p256dh"));
        }
        if req.keys.auth.trim().is_empty() {
            return Err(ValidationError::MissingField("keys.auth"));
        }

        let endpoint = Url::parse(req.endpoint.trim())
            .map_err(|e| ValidationError::InvalidEndpoint(e.to_string()))?;
        if !matches!(endpoint.scheme(), "https" | "http") || endpoint.host_str().is_none() {
            return Err(ValidationError::InvalidEndpoint(format!(
                "{} is not an http(s) URL",
                endpoint
            )));
        }

        let p256dh = decode_base64url("keys.p256dh", &req.keys.p256dh)?;
        if p256dh.len() != P256DH_KEY_LEN || p256dh[0] != 0x04 {
            return Err(ValidationError::InvalidKey {
                field: "keys.p256dh",
                reason: format!(
                    "expected a {}-byte uncompressed P-256 point, got {} bytes",
                    P256DH_KEY_LEN,
                    p256dh.len()
                ),
            });
        }

        let auth = decode_base64url("keys.auth", &req.keys.auth)?;
        if auth.len() != AUTH_SECRET_LEN {
            return Err(ValidationError::InvalidKey {
                field: "keys.auth",
                reason: format!("expected {} bytes, got {}", AUTH_SECRET_LEN, auth.len()),
            });
        }

        Ok(Self {
            endpoint,
            p256dh,
            auth,
        })
    }
}

/// Decode base64url, tolerating padding and the standard alphabet
fn decode_base64url(field: &'static str, value: &str) -> Result<Vec<u8>, ValidationError> {
    let normalized: String = value
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|e| ValidationError::InvalidKey {
            field,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256DH: &str =
        "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";

    fn request(endpoint: &str, p256dh: &str, auth: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: auth.to_string(),
            },
        }
    }

    #[test]
    fn test_valid_subscription() {
        let sub = PushSubscription::try_from(request(
            "https://push.example.net/push/abc",
            P256DH,
            AUTH,
        ))
        .unwrap();
        assert_eq!(sub.endpoint().host_str(), Some("push.example.net"));
        assert_eq!(sub.p256dh().len(), 65);
        assert_eq!(sub.auth().len(), 16);
    }

    #[test]
    fn test_browser_json_with_expiration_time() {
        let json = format!(
            r#"{{"endpoint":"https://fcm.googleapis.com/fcm/send/x","expirationTime":null,"keys":{{"p256dh":"{}","auth":"{}=="}}}}"#,
            P256DH, AUTH
        );
        let req: SubscriptionRequest = serde_json::from_str(&json).unwrap();
        assert!(PushSubscription::try_from(req).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let req: SubscriptionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            PushSubscription::try_from(req),
            Err(ValidationError::MissingField("endpoint"))
        );

        let req: SubscriptionRequest =
            serde_json::from_str(r#"{"endpoint":"https://push.example.net/x"}"#).unwrap();
        assert_eq!(
            PushSubscription::try_from(req),
            Err(ValidationError::MissingField("keys.p256dh"))
        );

        assert_eq!(
            PushSubscription::try_from(request("https://push.example.net/x", P256DH, "")),
            Err(ValidationError::MissingField("keys.auth"))
        );
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(matches!(
            PushSubscription::try_from(request("not a url", P256DH, AUTH)),
            Err(ValidationError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            PushSubscription::try_from(request("ftp://push.example.net/x", P256DH, AUTH)),
            Err(ValidationError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_key_sizes() {
        assert!(matches!(
            PushSubscription::try_from(request("https://push.example.net/x", AUTH, AUTH)),
            Err(ValidationError::InvalidKey { field: "keys.p256dh", .. })
        ));
        assert!(matches!(
            PushSubscription::try_from(request("https://push.example.net/x", P256DH, P256DH)),
            Err(ValidationError::InvalidKey { field: "keys.auth", .. })
        ));
        assert!(matches!(
            PushSubscription::try_from(request("https://push.example.net/x", "!!!", AUTH)),
            Err(ValidationError::InvalidKey { field: "keys.p256dh", .. })
        ));
    }
}
