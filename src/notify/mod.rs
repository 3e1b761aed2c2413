//! Notification delivery
//!
//! A [`Notifier`] pushes a short message about a trip to a user. The only
//! backend is [`WebhookNotifier`], which posts a JSON payload signed as an
//! HS256 JWT. A crawl session becomes a notification through
//! [`digest_record`].

mod digest;
mod webhook;

pub use digest::{digest_record, TripTarget, DIGEST_MESSAGE_TYPE};
pub use webhook::{NavigationTarget, WebhookNotifier, WebhookPayload, NOTIFICATION_ACTION};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to sign notification: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Notification endpoint returned HTTP {0}")]
    Status(u16),
}

/// What to tell the user and where the app should take them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub trip_id: String,
    pub leg_request_id: String,

    /// Recipient; also used as the navigation email
    pub email_id: String,
}

/// A notification delivery backend
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
