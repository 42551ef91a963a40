//! Mapping between backend payloads and UI-facing models.

use super::payloads::{
    ApiKeyPayload, CampaignPayload, CheckoutRequestPayload, CheckoutSessionPayload,
    CreateApiKeyPayload, CreateCampaignPayload, CreateWebhookPayload, CreatedApiKeyPayload,
    PricePayload, SubscriptionPayload, WaitlistEntryPayload, WebhookPayload,
};
use crate::models::{
    ApiKey, ApiKeyId, BillingInterval, Campaign, CampaignId, CampaignStatus, CheckoutSession,
    CreatedApiKey, NewApiKey, NewCampaign, NewCheckout, NewWebhook, Price, PriceId, Subscription,
    SubscriptionStatus, WaitlistEntry, Webhook, WebhookId,
};
use crate::error::{Error, Result};
use chrono::DateTime;
use rust_decimal::Decimal;

/// Currencies charged in whole units, without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Converts API payloads to models and back.
pub struct DataConverter;

impl DataConverter {
    /// Convert a price payload to our Price model.
    pub fn convert_price(price: PricePayload) -> Price {
        let currency = price.currency.to_uppercase();
        let scale = Self::minor_unit_scale(&currency);

        Price {
            id: PriceId(price.price_id),
            description: price.description,
            amount: Decimal::new(price.unit_amount, scale),
            currency,
            interval: Self::convert_interval(price.interval.as_deref()),
        }
    }

    /// Convert a Price back to its wire form.
    ///
    /// Fails if the amount is finer than the currency's minor unit or does
    /// not fit the wire's 64-bit minor-unit count.
    pub fn price_payload(price: &Price) -> Result<PricePayload> {
        let scale = Self::minor_unit_scale(&price.currency);
        let amount = price.amount.normalize();
        if amount.scale() > scale {
            return Err(Error::invalid_input(format!(
                "{} {} is more precise than the currency's minor unit",
                price.amount, price.currency
            )));
        }

        let mut minor = amount;
        minor.rescale(scale);
        let unit_amount = i64::try_from(minor.mantissa()).map_err(|_| {
            Error::invalid_input(format!(
                "{} {} is out of range",
                price.amount, price.currency
            ))
        })?;

        Ok(PricePayload {
            price_id: price.id.0.clone(),
            description: price.description.clone(),
            unit_amount,
            currency: price.currency.to_lowercase(),
            interval: match price.interval {
                BillingInterval::Month => Some("month".to_string()),
                BillingInterval::Year => Some("year".to_string()),
                BillingInterval::OneTime => None,
            },
        })
    }

    /// Wire body for starting a checkout.
    pub fn checkout_request(checkout: &NewCheckout) -> CheckoutRequestPayload {
        CheckoutRequestPayload {
            price_id: checkout.price_id.0.clone(),
            quantity: checkout.quantity,
        }
    }

    /// Convert a checkout session payload.
    pub fn convert_checkout_session(session: CheckoutSessionPayload) -> CheckoutSession {
        CheckoutSession {
            id: session.session_id,
            client_secret: session.client_secret,
            url: session.url,
        }
    }

    /// Convert a subscription payload to our Subscription model.
    pub fn convert_subscription(subscription: SubscriptionPayload) -> Subscription {
        Subscription {
            id: subscription.subscription_id,
            status: Self::convert_subscription_status(&subscription.status),
            price_id: PriceId(subscription.price_id),
            renews_at: subscription
                .current_period_end
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            cancel_at_period_end: subscription.cancel_at_period_end,
        }
    }

    /// Convert a campaign payload to our Campaign model.
    pub fn convert_campaign(campaign: CampaignPayload) -> Campaign {
        Campaign {
            id: CampaignId(campaign.id),
            name: campaign.name,
            slug: campaign.slug,
            status: Self::convert_campaign_status(&campaign.status),
            signups: campaign.waitlist_count,
            created_at: campaign.created_at,
        }
    }

    /// Convert a Campaign back to its wire form.
    ///
    /// Status aliases and unknown statuses were normalized on the way in, so
    /// the status written here is always the canonical name.
    pub fn campaign_payload(campaign: &Campaign) -> CampaignPayload {
        CampaignPayload {
            id: campaign.id.0,
            name: campaign.name.clone(),
            slug: campaign.slug.clone(),
            status: Self::campaign_status_name(campaign.status).to_string(),
            waitlist_count: campaign.signups,
            created_at: campaign.created_at,
        }
    }

    /// Wire body for creating a campaign. The name is trimmed.
    pub fn create_campaign_request(campaign: &NewCampaign) -> CreateCampaignPayload {
        CreateCampaignPayload {
            name: campaign.name.trim().to_string(),
            slug: campaign.slug.clone(),
        }
    }

    /// Convert a waitlist entry payload.
    pub fn convert_waitlist_entry(entry: WaitlistEntryPayload) -> WaitlistEntry {
        WaitlistEntry {
            id: entry.id,
            email: entry.email,
            position: entry.position,
            referrals: entry.referral_count,
            joined_at: entry.created_at,
        }
    }

    /// Convert a webhook payload.
    pub fn convert_webhook(webhook: WebhookPayload) -> Webhook {
        Webhook {
            id: WebhookId(webhook.id),
            url: webhook.url,
            events: webhook.events,
            enabled: webhook.enabled,
            created_at: webhook.created_at,
        }
    }

    /// Wire body for registering a webhook.
    pub fn create_webhook_request(webhook: &NewWebhook) -> CreateWebhookPayload {
        CreateWebhookPayload {
            url: webhook.url.clone(),
            events: webhook.events.clone(),
        }
    }

    /// Convert an API key payload.
    pub fn convert_api_key(key: ApiKeyPayload) -> ApiKey {
        ApiKey {
            id: ApiKeyId(key.id),
            name: key.name,
            prefix: key.key_prefix,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
        }
    }

    /// Convert a freshly created API key, secret included.
    pub fn convert_created_api_key(created: CreatedApiKeyPayload) -> CreatedApiKey {
        CreatedApiKey {
            key: Self::convert_api_key(created.api_key),
            secret: created.secret,
        }
    }

    /// Wire body for minting an API key. The name is trimmed.
    pub fn create_api_key_request(key: &NewApiKey) -> CreateApiKeyPayload {
        CreateApiKeyPayload {
            name: key.name.trim().to_string(),
        }
    }

    fn minor_unit_scale(currency: &str) -> u32 {
        let upper = currency.to_uppercase();
        if ZERO_DECIMAL_CURRENCIES.contains(&upper.as_str()) {
            0
        } else {
            2
        }
    }

    fn convert_interval(interval: Option<&str>) -> BillingInterval {
        match interval.map(str::to_lowercase).as_deref() {
            Some("month") | Some("monthly") => BillingInterval::Month,
            Some("year") | Some("yearly") | Some("annual") => BillingInterval::Year,
            _ => BillingInterval::OneTime,
        }
    }

    fn convert_subscription_status(status: &str) -> SubscriptionStatus {
        match status.to_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" | "unpaid" => SubscriptionStatus::PastDue,
            "canceled" | "cancelled" => SubscriptionStatus::Canceled,
            "incomplete" | "incomplete_expired" => SubscriptionStatus::Incomplete,
            _ => SubscriptionStatus::Unknown,
        }
    }

    fn convert_campaign_status(status: &str) -> CampaignStatus {
        match status.to_lowercase().as_str() {
            "active" | "live" => CampaignStatus::Active,
            "paused" => CampaignStatus::Paused,
            "archived" => CampaignStatus::Archived,
            _ => CampaignStatus::Draft,
        }
    }

    fn campaign_status_name(status: CampaignStatus) -> &'static str {
        match status {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Archived => "archived",
        }
    }
}
