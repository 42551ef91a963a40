//! Billing resources: prices, subscription, checkout.

use super::Resources;
use crate::api::payloads::{ListPayload, PricePayload, SubscriptionPayload};
use crate::api::{ApiRequest, DataConverter};
use crate::models::{CheckoutSession, NewCheckout, Price, Subscription};
use crate::request::RequestController;

const PRICES_PATH: &str = "/api/protected/billing/prices";
const SUBSCRIPTION_PATH: &str = "/api/protected/billing/subscription";
const CHECKOUT_PATH: &str = "/api/protected/billing/checkout-session";

impl Resources {
    /// Purchasable prices.
    pub fn prices(&self) -> RequestController<(), Vec<Price>> {
        self.controller(
            "prices",
            |_| Ok(ApiRequest::get(PRICES_PATH)),
            |prices: ListPayload<PricePayload>| {
                prices
                    .into_vec()
                    .into_iter()
                    .map(DataConverter::convert_price)
                    .collect()
            },
        )
    }

    /// The account's subscription; `None` when on the free plan.
    pub fn subscription(&self) -> RequestController<(), Option<Subscription>> {
        self.controller(
            "subscription",
            |_| Ok(ApiRequest::get(SUBSCRIPTION_PATH)),
            |subscription: Option<SubscriptionPayload>| {
                subscription.map(DataConverter::convert_subscription)
            },
        )
    }

    /// Start an embedded checkout for a price.
    pub fn create_checkout(&self) -> RequestController<NewCheckout, CheckoutSession> {
        self.controller(
            "create-checkout",
            |checkout: NewCheckout| {
                checkout.validate()?;
                ApiRequest::post(CHECKOUT_PATH, &DataConverter::checkout_request(&checkout))
            },
            DataConverter::convert_checkout_session,
        )
    }
}
