//! Developer settings resources: webhooks and API keys.

use super::Resources;
use crate::api::payloads::{ApiKeyPayload, ListPayload, WebhookPayload};
use crate::api::{ApiRequest, DataConverter};
use crate::error::Error;
use crate::models::{ApiKey, ApiKeyId, CreatedApiKey, NewApiKey, NewWebhook, Webhook, WebhookId};
use crate::request::RequestController;
use serde::de::IgnoredAny;

const WEBHOOKS_PATH: &str = "/api/v1/webhooks";
const API_KEYS_PATH: &str = "/api/v1/api-keys";

impl Resources {
    /// Registered webhook endpoints.
    pub fn webhooks(&self) -> RequestController<(), Vec<Webhook>> {
        self.controller(
            "webhooks",
            |_| Ok(ApiRequest::get(WEBHOOKS_PATH)),
            |webhooks: ListPayload<WebhookPayload>| {
                webhooks
                    .into_vec()
                    .into_iter()
                    .map(DataConverter::convert_webhook)
                    .collect()
            },
        )
    }

    /// Register a webhook endpoint. The URL must be HTTPS.
    pub fn create_webhook(&self) -> RequestController<NewWebhook, Webhook> {
        self.controller(
            "create-webhook",
            |webhook: NewWebhook| {
                webhook.validate()?;
                ApiRequest::post(
                    WEBHOOKS_PATH,
                    &DataConverter::create_webhook_request(&webhook),
                )
            },
            DataConverter::convert_webhook,
        )
    }

    /// Remove a webhook. Any response body is ignored.
    pub fn delete_webhook(&self) -> RequestController<WebhookId, ()> {
        self.controller(
            "delete-webhook",
            |id: WebhookId| Ok(ApiRequest::delete(format!("{WEBHOOKS_PATH}/{id}"))),
            |_: IgnoredAny| (),
        )
    }

    /// API keys, without their secrets.
    pub fn api_keys(&self) -> RequestController<(), Vec<ApiKey>> {
        self.controller(
            "api-keys",
            |_| Ok(ApiRequest::get(API_KEYS_PATH)),
            |keys: ListPayload<ApiKeyPayload>| {
                keys.into_vec()
                    .into_iter()
                    .map(DataConverter::convert_api_key)
                    .collect()
            },
        )
    }

    /// Mint a key. The secret in the result is not retrievable again.
    pub fn create_api_key(&self) -> RequestController<NewApiKey, CreatedApiKey> {
        self.controller(
            "create-api-key",
            |key: NewApiKey| {
                if key.name.trim().is_empty() {
                    return Err(Error::invalid_input("api key name must not be empty"));
                }
                ApiRequest::post(API_KEYS_PATH, &DataConverter::create_api_key_request(&key))
            },
            DataConverter::convert_created_api_key,
        )
    }

    /// Revoke an API key. Any response body is ignored.
    pub fn revoke_api_key(&self) -> RequestController<ApiKeyId, ()> {
        self.controller(
            "revoke-api-key",
            |id: ApiKeyId| Ok(ApiRequest::delete(format!("{API_KEYS_PATH}/{id}"))),
            |_: IgnoredAny| (),
        )
    }
}
