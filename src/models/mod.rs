//! UI-facing domain models.
//!
//! These are the shapes consumers render. Backend payloads are mapped into
//! them by [`crate::api::DataConverter`].

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| crate::Error::invalid_input(format!("{s}: {e}")))
            }
        }
    };
}

mod billing;
mod campaign;
mod developer;

pub use billing::{
    BillingInterval, CheckoutSession, NewCheckout, Price, PriceId, Subscription,
    SubscriptionStatus,
};
pub use campaign::{Campaign, CampaignId, CampaignStatus, NewCampaign, WaitlistEntry};
pub use developer::{ApiKey, ApiKeyId, CreatedApiKey, NewApiKey, NewWebhook, Webhook, WebhookId};
