//! Main application module.
//!
//! `App` wires configuration to an API client and runs one CLI command
//! through its resource controller, rendering each state change.

use crate::api::{ApiClientBuilder, Backend, Session};
use crate::cli::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{NewApiKey, NewCampaign, NewCheckout, NewWebhook};
use crate::request::{ReloadPolicy, RequestController, RequestState, RequestStatus};
use crate::resources::Resources;

use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// The main application.
pub struct App {
    /// Controller factory over the configured backend.
    resources: Resources,
    /// Re-run interval for read-only commands.
    watch: Option<Duration>,
}

impl App {
    /// Create a new application talking to the configured backend.
    pub fn new(config: Config) -> Result<Self> {
        let session = Session::from_config(&config.api.credential)?;
        let client = ApiClientBuilder::new()
            .config(config.api.clone())
            .session(session)
            .build()?;

        info!(
            base_url = client.base_url(),
            authenticated = client.is_authenticated(),
            "API client ready"
        );

        Ok(Self::with_backend(config, Arc::new(client)))
    }

    /// Create an application over an arbitrary backend.
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            resources: Resources::new(backend, config.controller.options()),
            watch: watch_interval(config.controller.watch_secs),
        }
    }

    /// Override the configured watch interval. `Some(0)` disables watching.
    pub fn watch(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.watch = watch_interval(secs);
        }
        self
    }

    /// Run one command to completion.
    ///
    /// Read-only commands repeat on the watch interval until interrupted.
    /// Returns an error if the request fails; cancellation is not an error.
    pub async fn run(&self, command: Command) -> Result<()> {
        let watch = if command.is_read_only() {
            self.watch
        } else {
            if self.watch.is_some() {
                warn!("--watch ignored for commands that modify data");
            }
            None
        };

        let resources = match watch {
            Some(_) => self.resources.with_options(
                self.resources
                    .options()
                    .with_reload(ReloadPolicy::StaleWhileRevalidate),
            ),
            None => self.resources.clone(),
        };

        match command {
            Command::Prices => present(resources.prices(), (), watch).await,
            Command::Subscription => present(resources.subscription(), (), watch).await,
            Command::Checkout { price_id, quantity } => {
                let checkout = NewCheckout { price_id, quantity };
                present(resources.create_checkout(), checkout, watch).await
            }
            Command::Campaigns => present(resources.campaigns(), (), watch).await,
            Command::Campaign { id } => present(resources.campaign(), id, watch).await,
            Command::CreateCampaign { name, slug } => {
                let campaign = NewCampaign { name, slug };
                present(resources.create_campaign(), campaign, watch).await
            }
            Command::Waitlist { campaign_id } => {
                present(resources.waitlist(), campaign_id, watch).await
            }
            Command::Webhooks => present(resources.webhooks(), (), watch).await,
            Command::CreateWebhook { url, events } => {
                let webhook = NewWebhook { url, events };
                present(resources.create_webhook(), webhook, watch).await
            }
            Command::DeleteWebhook { id } => present(resources.delete_webhook(), id, watch).await,
            Command::ApiKeys => present(resources.api_keys(), (), watch).await,
            Command::CreateApiKey { name } => {
                present(resources.create_api_key(), NewApiKey { name }, watch).await
            }
            Command::RevokeApiKey { id } => present(resources.revoke_api_key(), id, watch).await,
        }
    }
}

fn watch_interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Attach `controller`, render its states and return once it settles.
///
/// With a watch interval the request is re-executed on every tick and only
/// Ctrl-C ends the loop.
async fn present<A, T>(
    controller: RequestController<A, T>,
    args: A,
    watch: Option<Duration>,
) -> Result<()>
where
    A: Clone + Send + 'static,
    T: Serialize + Clone + Send + Sync + 'static,
{
    let mut updates = controller.updates();
    let _attachment = controller.attach(args.clone());
    if !controller.options().execute_on_attach {
        controller.execute(args.clone());
    }

    let mut ticker = watch.map(|period| {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(state) = update else {
                    return Ok(());
                };
                if let Some(outcome) = render(controller.name(), &state)? {
                    if ticker.is_none() {
                        return outcome;
                    }
                }
            }
            _ = tick(&mut ticker) => {
                let token = controller.execute(args.clone());
                debug!(controller = controller.name(), %token, "Refreshing");
            }
            _ = &mut interrupted => {
                controller.cancel();
                info!(controller = controller.name(), "Interrupted");
                return Ok(());
            }
        }
    }
}

/// Print one state. Returns the command outcome once the state is settled.
fn render<T: Serialize>(name: &str, state: &RequestState<T>) -> Result<Option<Result<()>>> {
    match state.status() {
        RequestStatus::Idle => Ok(None),
        RequestStatus::Loading => {
            if state.data().is_some() {
                debug!(controller = name, "Revalidating");
            } else {
                info!(controller = name, "Loading");
            }
            Ok(None)
        }
        RequestStatus::Succeeded => {
            println!("{}", serde_json::to_string_pretty(&state.data())?);
            Ok(Some(Ok(())))
        }
        RequestStatus::Failed => {
            let message = state
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string());
            error!(controller = name, error = %message, "Request failed");
            Ok(Some(Err(Error::application(message))))
        }
        RequestStatus::Cancelled => {
            info!(controller = name, "Request cancelled");
            Ok(Some(Ok(())))
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => futures::future::pending().await,
    }
}
