use crate::constants::{SUBSCRIBE_ENDPOINT, VAPID_PUBLIC_KEY_ENDPOINT};
use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::{PushSubscription, SubscribeResponse, SubscriptionKeys, SubscriptionRequest};
use log::info;
use reqwest::blocking::Client;

/// Fetch the server's VAPID public key and check that it is a P-256 point
pub fn fetch_public_key(server: &str) -> Result<String> {
    let url = format!("{}{}", server.trim_end_matches('/'), VAPID_PUBLIC_KEY_ENDPOINT);
    let response = Client::new()
        .get(&url)
        .send()
        .context("Failed to connect to server")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("Fetching public key failed: {} - {}", status, error_text);
    }

    let key = response.text().context("Failed to read public key")?;
    let key = key.trim().to_string();
    check_public_key(&key)?;
    Ok(key)
}

fn check_public_key(key: &str) -> Result<()> {
    let bytes = URL_SAFE_NO_PAD
        .decode(key)
        .context("Public key is not base64url")?;
    anyhow::ensure!(
        bytes.len() == 65 && bytes[0] == 0x04,
        "Public key is not an uncompressed P-256 point ({} bytes)",
        bytes.len()
    );
    Ok(())
}

/// Register a push subscription, as a browser would after
/// `PushManager.subscribe()`. Returns the recipient id the server assigned.
pub fn subscribe(server: &str, endpoint: &str, p256dh: &str, auth: &str) -> Result<String> {
    let request = SubscriptionRequest {
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: p256dh.to_string(),
            auth: auth.to_string(),
        },
    };

    // Same checks the server applies, so mistakes are reported locally
    PushSubscription::try_from(request.clone()).context("Invalid subscription")?;

    let url = format!("{}{}", server.trim_end_matches('/'), SUBSCRIBE_ENDPOINT);
    let response = Client::new()
        .post(&url)
        .json(&request)
        .send()
        .context("Failed to connect to server")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("Subscribe failed: {} - {}", status, error_text);
    }

    let result: SubscribeResponse = response.json().context("Invalid subscribe response")?;
    info!("Subscribed {} as recipient {}", endpoint, result.user_id);
    Ok(result.user_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_check() {
        let keys = crypto::VapidKeyPair::generate();
        assert!(check_public_key(keys.public_key_base64url()).is_ok());
        assert!(check_public_key("not base64 !").is_err());
        assert!(check_public_key(&URL_SAFE_NO_PAD.encode([4u8; 33])).is_err());
    }

    #[test]
    fn test_invalid_subscription_is_rejected_locally() {
        let err = subscribe("http://127.0.0.1:1", "not a url", "AAAA", "AAAA").unwrap_err();
        assert!(err.to_string().contains("Invalid subscription"));
    }
}
