//! Developer settings: webhooks and API keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id! {
    /// Webhook endpoint identifier.
    WebhookId
}

uuid_id! {
    /// API key identifier.
    ApiKeyId
}

/// A registered webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: WebhookId,
    pub url: String,
    /// Event types delivered to this endpoint.
    pub events: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to register a webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWebhook {
    pub url: String,
    pub events: Vec<String>,
}

impl NewWebhook {
    /// Endpoints must be HTTPS and subscribe to at least one event.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.url.starts_with("https://") {
            return Err(crate::Error::invalid_input(format!(
                "webhook url must use https: {}",
                self.url
            )));
        }
        if self.events.is_empty() {
            return Err(crate::Error::invalid_input(
                "webhook must subscribe to at least one event",
            ));
        }
        Ok(())
    }
}

/// An API key, without its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub name: String,
    /// First characters of the secret, for recognition.
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Request to mint an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub name: String,
}

/// A freshly created key. The secret is only ever returned once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub key: ApiKey,
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_validation() {
        let mut webhook = NewWebhook {
            url: "https://example.com/hooks".into(),
            events: vec!["waitlist.joined".into()],
        };
        assert!(webhook.validate().is_ok());

        webhook.events.clear();
        assert!(webhook.validate().is_err());

        webhook.events.push("waitlist.joined".into());
        webhook.url = "http://example.com/hooks".into();
        assert!(webhook.validate().is_err());
    }
}
