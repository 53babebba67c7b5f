use crate::{DeliveryError, FanOutReport};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::utils::current_timestamp_secs;
use common::{NotificationPayload, PushSubscription, RecipientId};
use crypto::VapidKeyPair;
use futures_util::future::join_all;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::time::Duration;
use storage::SubscriptionRegistry;
use tracing::{debug, info, warn};
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

/// Bytes of a rejected push's response body kept for logs
pub const MAX_ERROR_BODY_LEN: usize = 512;

/// RFC 8292 forbids VAPID tokens valid for more than 24 hours
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// VAPID `sub` claim, a `mailto:` or `https:` contact
    pub subject: String,
    /// How long the push service may hold an undelivered message
    pub ttl_seconds: u32,
    /// Lifetime of each VAPID token, capped at 24 hours
    pub token_ttl: Duration,
    /// Transport timeout for one push request
    pub timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            subject: "mailto:notifications@localhost".to_string(),
            ttl_seconds: 30,
            token_ttl: Duration::from_secs(30 * 60),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Sends push messages. Holds no per-message state, so one instance is shared
/// by every request handler.
pub struct PushDispatcher {
    client: reqwest::Client,
    subject: String,
    ttl_seconds: u32,
    token_ttl: Duration,
}

impl PushDispatcher {
    pub fn new(config: DispatcherConfig) -> Result<Self, DeliveryError> {
        if config.token_ttl > MAX_TOKEN_LIFETIME {
            warn!(
                requested = ?config.token_ttl,
                "VAPID token lifetime above 24h, capping"
            );
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            subject: normalize_subject(&config.subject),
            ttl_seconds: config.ttl_seconds,
            token_ttl: config.token_ttl.min(MAX_TOKEN_LIFETIME),
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Encrypt `payload` for `subscription` and hand it to its push service.
    /// Only `201 Created` counts as delivered.
    pub async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
        keys: &VapidKeyPair,
    ) -> Result<(), DeliveryError> {
        let content = serde_json::to_vec(payload)?;

        let sub_info = SubscriptionInfo::new(
            subscription.endpoint().to_string(),
            URL_SAFE_NO_PAD.encode(subscription.p256dh()),
            URL_SAFE_NO_PAD.encode(subscription.auth()),
        );

        // `aud` and `exp` override the crate defaults: the origin keeps a
        // non-default port, and tokens live `token_ttl` instead of 12 hours
        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&keys.private_key_base64url(), &sub_info)?;
        sig_builder.add_claim("aud", subscription.endpoint().origin().ascii_serialization());
        sig_builder.add_claim("exp", current_timestamp_secs() + self.token_ttl.as_secs());
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder.build()?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &content);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl_seconds);
        let message = builder.build()?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            // carries the `Authorization: vapid t=…, k=…` header
            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }

        Err(DeliveryError::UnexpectedStatus {
            status: status.as_u16(),
            body: read_error_body(response).await,
        })
    }

    /// Notify every registered recipient in `recipients`.
    ///
    /// Unknown ids are skipped, and an id listed twice is notified once.
    /// Deliveries run concurrently and a failure never stops the others.
    pub async fn fan_out(
        &self,
        registry: &SubscriptionRegistry,
        recipients: &[RecipientId],
        payload: &NotificationPayload,
        keys: &VapidKeyPair,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        let mut seen = HashSet::new();
        let mut attempts = Vec::new();

        for recipient in recipients {
            if !seen.insert(recipient) {
                continue;
            }
            match registry.lookup(recipient) {
                Some(subscription) => attempts.push(async move {
                    let result = self.deliver(&subscription, payload, keys).await;
                    (recipient, result)
                }),
                None => {
                    debug!(recipient = %recipient, "No subscription for recipient, skipping");
                    report.skipped += 1;
                }
            }
        }

        for (recipient, result) in join_all(attempts).await {
            match result {
                Ok(()) => {
                    info!(recipient = %recipient, "Push notification delivered");
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "Push notification failed");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// Read at most `MAX_ERROR_BODY_LEN` bytes of the response body
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY_LEN {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(MAX_ERROR_BODY_LEN);

    match String::from_utf8(body) {
        Ok(text) => text,
        // the cut may land inside a multi-byte character
        Err(e) => {
            let valid = e.utf8_error().valid_up_to();
            String::from_utf8_lossy(&e.as_bytes()[..valid]).into_owned()
        }
    }
}

/// Push services want a URI; a bare address becomes `mailto:`
fn normalize_subject(subject: &str) -> String {
    let subject = subject.trim();
    if subject.starts_with("mailto:") || subject.starts_with("https:") || !subject.contains('@') {
        subject.to_string()
    } else {
        format!("mailto:{}", subject)
    }
}
