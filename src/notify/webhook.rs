//! Signed webhook notifier

use crate::config::NotifyConfig;
use crate::notify::{Notification, Notifier, NotifyError};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Action name the receiving app dispatches on
pub const NOTIFICATION_ACTION: &str = "SmartNotification";

/// Header carrying the signed payload
const TOKEN_HEADER: &str = "access-token";

/// Body posted to the notification endpoint, also used as the JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub user: Vec<String>,
    pub title: String,
    pub body: String,
    pub trip_id: String,
    pub action: String,
    pub navigation: NavigationTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTarget {
    pub leg_request_id: String,
    pub trip_id: String,
    pub email_id: String,
}

impl WebhookPayload {
    /// Builds the payload for one notification
    ///
    /// The configured recipient is used when set; otherwise the
    /// notification's own email.
    pub fn new(notification: &Notification, recipient: &str) -> Self {
        let user = if recipient.is_empty() {
            notification.email_id.clone()
        } else {
            recipient.to_string()
        };

        Self {
            user: vec![user.clone()],
            title: notification.title.clone(),
            body: notification.body.clone(),
            trip_id: notification.trip_id.clone(),
            action: NOTIFICATION_ACTION.to_string(),
            navigation: NavigationTarget {
                leg_request_id: notification.leg_request_id.clone(),
                trip_id: notification.trip_id.clone(),
                email_id: user,
            },
        }
    }
}

/// Posts notifications to an HTTP endpoint with an HS256 `access-token`
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    recipient: String,
    key: EncodingKey,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("endpoint", &self.endpoint)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            recipient: config.recipient.clone(),
            key: EncodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// Signs a payload as an HS256 JWT
    pub fn sign(&self, payload: &WebhookPayload) -> Result<String, NotifyError> {
        Ok(encode(&Header::default(), payload, &self.key)?)
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = WebhookPayload::new(notification, &self.recipient);
        let token = self.sign(&payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(TOKEN_HEADER, token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::info!(
            "Notification sent for trip {} to {}",
            payload.trip_id,
            payload.user.join(", ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notification() -> Notification {
        Notification {
            title: "Heads up".into(),
            body: "Rain expected at arrival".into(),
            trip_id: "0555-0809".into(),
            leg_request_id: "leg-1".into(),
            email_id: "traveller@example.com".into(),
        }
    }

    fn config(endpoint: String) -> NotifyConfig {
        NotifyConfig {
            enabled: true,
            endpoint,
            secret: "test-secret".into(),
            recipient: String::new(),
            ..NotifyConfig::default()
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload::new(&notification(), "");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "user": ["traveller@example.com"],
                "title": "Heads up",
                "body": "Rain expected at arrival",
                "tripId": "0555-0809",
                "action": "SmartNotification",
                "navigation": {
                    "legRequestId": "leg-1",
                    "tripId": "0555-0809",
                    "emailId": "traveller@example.com"
                }
            })
        );
    }

    #[test]
    fn test_configured_recipient_wins() {
        let payload = WebhookPayload::new(&notification(), "ops@example.com");
        assert_eq!(payload.user, vec!["ops@example.com".to_string()]);
        assert_eq!(payload.navigation.email_id, "ops@example.com");
    }

    #[test]
    fn test_token_decodes_to_payload() {
        let notifier = WebhookNotifier::new(&config("http://localhost/".into())).unwrap();
        let payload = WebhookPayload::new(&notification(), "");
        let token = notifier.sign(&payload).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let decoded = decode::<WebhookPayload>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(decoded.claims, payload);

        let wrong = decode::<WebhookPayload>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &validation,
        );
        assert!(wrong.is_err());
    }

    #[tokio::test]
    async fn test_send_posts_signed_payload() {
        let server = MockServer::start().await;
        let expected = serde_json::to_value(WebhookPayload::new(&notification(), "")).unwrap();

        Mock::given(method("POST"))
            .and(path("/service/notification"))
            .and(header_exists("access-token"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(&config(format!("{}/service/notification", server.uri())))
                .unwrap();
        notifier.send(&notification()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_reports_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&config(server.uri())).unwrap();
        let err = notifier.send(&notification()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status(500)));
    }
}
