//! Billing models: prices, checkout sessions and subscriptions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment processor price identifier (e.g. `price_1Nx...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceId(pub String);

impl std::fmt::Display for PriceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PriceId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(crate::Error::invalid_input("price id must not be empty"));
        }
        Ok(Self(s.to_string()))
    }
}

/// How often a price is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BillingInterval {
    Month,
    Year,
    #[default]
    OneTime,
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
            Self::OneTime => write!(f, "one-time"),
        }
    }
}

/// A purchasable plan price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Price ID.
    pub id: PriceId,
    /// Plan name shown to the user.
    pub description: String,
    /// Amount in major currency units.
    pub amount: Decimal,
    /// ISO currency code, upper-case.
    pub currency: String,
    /// Billing interval.
    pub interval: BillingInterval,
}

impl Price {
    /// Human readable amount, e.g. `12.00 USD / month`.
    pub fn display_amount(&self) -> String {
        match self.interval {
            BillingInterval::OneTime => format!("{:.2} {}", self.amount, self.currency),
            interval => format!("{:.2} {} / {}", self.amount, self.currency, interval),
        }
    }
}

/// Request to start a checkout for a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckout {
    pub price_id: PriceId,
    pub quantity: u32,
}

impl NewCheckout {
    /// Checkout a single unit of `price_id`.
    pub fn new(price_id: PriceId) -> Self {
        Self {
            price_id,
            quantity: 1,
        }
    }

    /// Reject requests the backend would refuse anyway.
    pub fn validate(&self) -> crate::Result<()> {
        if self.quantity == 0 {
            return Err(crate::Error::invalid_input("quantity must be at least 1"));
        }
        Ok(())
    }
}

/// An embedded checkout session handed to the payment UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub client_secret: String,
    /// Hosted checkout page, when the backend created one.
    pub url: Option<String>,
}

/// Subscription status as reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    Unknown,
}

impl SubscriptionStatus {
    /// Whether the customer currently has access to paid features.
    pub fn is_entitled(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// The account's current subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub price_id: PriceId,
    /// End of the current billing period.
    pub renews_at: Option<DateTime<Utc>>,
    /// Whether the subscription ends instead of renewing.
    pub cancel_at_period_end: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_amount() {
        let mut price = Price {
            id: PriceId("p1".into()),
            description: "Basic".into(),
            amount: dec!(12),
            currency: "USD".into(),
            interval: BillingInterval::Month,
        };
        assert_eq!(price.display_amount(), "12.00 USD / month");

        price.interval = BillingInterval::OneTime;
        price.amount = dec!(99.5);
        assert_eq!(price.display_amount(), "99.50 USD");
    }

    #[test]
    fn test_checkout_validation() {
        let mut checkout = NewCheckout::new(PriceId("p1".into()));
        assert!(checkout.validate().is_ok());
        checkout.quantity = 0;
        assert!(checkout.validate().is_err());
    }

    #[test]
    fn test_price_id_parse() {
        assert_eq!("  p1 ".parse::<PriceId>().unwrap(), PriceId("p1".into()));
        assert!("".parse::<PriceId>().is_err());
    }

    #[test]
    fn test_entitlement() {
        assert!(SubscriptionStatus::Trialing.is_entitled());
        assert!(!SubscriptionStatus::PastDue.is_entitled());
    }
}
