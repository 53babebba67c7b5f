//! Web Push delivery: `web-push` encrypts a notification for one
//! subscription and signs the VAPID token, reqwest POSTs the result.

pub mod dispatcher;

use thiserror::Error;

pub use dispatcher::{DispatcherConfig, PushDispatcher};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize notification: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Signing or encryption failed, or the payload is too large
    #[error("failed to build push message: {0}")]
    Message(#[from] web_push::WebPushError),
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// `body` holds at most the first 512 bytes of the response
    #[error("push service answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Outcome counts of one fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: usize,
    /// Recipients with no registered subscription
    pub skipped: usize,
}

impl FanOutReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}
