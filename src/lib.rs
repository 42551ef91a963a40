//! # reqstate - request state for async UI data
//!
//! Tracks the lifecycle of asynchronous requests against a dashboard
//! backend: loading, error and data, with stale-response protection,
//! cancellation and scope-bound attach/detach.
//!
//! ## Architecture
//!
//! - **Request**: `RequestController`, the token-guarded state machine
//! - **API**: HTTP backend, session credentials and payload conversion
//! - **Models**: UI-facing domain types
//! - **Resources**: one controller constructor per backend endpoint
//! - **Config**: File and environment configuration
//! - **App / CLI**: Command-line front end

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod request;
pub mod resources;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use request::{
    Attachment, CancelSignal, ControllerOptions, Operation, ReloadPolicy, RequestController,
    RequestState, RequestStatus, RequestToken,
};
pub use resources::Resources;
