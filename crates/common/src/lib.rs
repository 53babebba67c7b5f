pub mod file_utils;
pub mod subscription;
pub mod utils;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use subscription::{PushSubscription, SubscriptionKeys, SubscriptionRequest, ValidationError};

/// Notification type understood by the service worker
pub const RECEIVED_PHOTO: &str = "RECEIVED_PHOTO";

/// Opaque handle for one registered push subscription.
///
/// Serialized as a JSON string. Integer ids are accepted on input so older
/// clients that send `"recipients": [1, 2]` keep working.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecipientId(String);

impl RecipientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecipientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => RecipientId(text),
            Raw::Number(n) => RecipientId(n.to_string()),
        })
    }
}

/// Photo upload request body
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadRequest {
    pub image: String, // data URL or raw base64
    #[serde(default)]
    pub recipients: Vec<RecipientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>, // sender name shown in the notification
}

/// Response to a successful photo upload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

/// Response to a successful subscription
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubscribeResponse {
    #[serde(rename = "userId")]
    pub user_id: RecipientId,
}

/// JSON body of every push message
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl NotificationPayload {
    pub fn received_photo(from: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            kind: RECEIVED_PHOTO.to_string(),
            from: from.into(),
            image_url: image_url.into(),
        }
    }
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
    pub subscriptions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_ids_accept_strings_and_numbers() {
        let req: UploadRequest =
            serde_json::from_str(r#"{"image":"AA==","recipients":["r1", 2]}"#).unwrap();
        assert_eq!(req.recipients, vec![RecipientId::new("r1"), RecipientId::new("2")]);
        assert!(req.from.is_none());
    }

    #[test]
    fn test_recipients_default_to_empty() {
        let req: UploadRequest = serde_json::from_str(r#"{"image":"AA=="}"#).unwrap();
        assert!(req.recipients.is_empty());
    }

    #[test]
    fn test_notification_payload_shape() {
        let payload = NotificationPayload::received_photo("Someone", "https://x/photo/a.jpg");
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"type":"RECEIVED_PHOTO","from":"Someone","imageUrl":"https://x/photo/a.jpg"}"#
        );
    }

    #[test]
    fn test_subscribe_response_uses_user_id_key() {
        let resp = SubscribeResponse {
            user_id: RecipientId::new("7"),
        };
        assert_eq!(serde_json::to_string(&resp).unwrap(), r#"{"userId":"7"}"#);
    }
}
