//! Command-line interface.
//!
//! Each subcommand drives one resource controller and prints the loaded data
//! as JSON. Ctrl-C cancels the request in flight.

use crate::models::{ApiKeyId, CampaignId, PriceId, WebhookId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reqstate - typed request state for the dashboard backend
#[derive(Debug, Parser)]
#[command(name = "reqstate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Re-run the request every SECS seconds, keeping stale data on screen
    #[arg(long, value_name = "SECS", global = true)]
    pub watch: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List purchasable prices
    Prices,

    /// Show the current subscription
    Subscription,

    /// Start a checkout session for a price
    Checkout {
        price_id: PriceId,

        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },

    /// List campaigns
    Campaigns,

    /// Show one campaign
    Campaign { id: CampaignId },

    /// Create a campaign
    CreateCampaign {
        #[arg(long)]
        name: String,

        #[arg(long)]
        slug: String,
    },

    /// Show a campaign's waitlist
    Waitlist { campaign_id: CampaignId },

    /// List webhooks
    Webhooks,

    /// Register a webhook endpoint
    CreateWebhook {
        #[arg(long)]
        url: String,

        /// Event to subscribe to (repeatable)
        #[arg(long = "event", required = true)]
        events: Vec<String>,
    },

    /// Delete a webhook
    DeleteWebhook { id: WebhookId },

    /// List API keys
    ApiKeys,

    /// Create an API key
    CreateApiKey {
        #[arg(long)]
        name: String,
    },

    /// Revoke an API key
    RevokeApiKey { id: ApiKeyId },
}

impl Command {
    /// Whether the command only reads. Mutations are never repeated by
    /// `--watch`.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::Prices
                | Self::Subscription
                | Self::Campaigns
                | Self::Campaign { .. }
                | Self::Waitlist { .. }
                | Self::Webhooks
                | Self::ApiKeys
        )
    }
}
