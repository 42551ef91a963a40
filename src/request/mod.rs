//! Request state tracking.
//!
//! A [`RequestController`] wraps one asynchronous [`Operation`] and exposes
//! its lifecycle as a [`RequestState`] snapshot: `Idle`, `Loading`,
//! `Succeeded`, `Failed` or `Cancelled`. Each call is stamped with a
//! [`RequestToken`] and only the latest call may touch state, so a slow
//! response can never overwrite a newer one.

mod cancel;
mod controller;
mod operation;
mod state;

pub use cancel::{CancelHandle, CancelSignal};
pub use controller::{Attachment, RequestController};
pub use operation::Operation;
pub use state::{ReloadPolicy, RequestState, RequestStatus, RequestToken};

use serde::{Deserialize, Serialize};

/// Behaviour switches for a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// What to do with old data on reload, failure and cancel.
    pub reload: ReloadPolicy,
    /// Execute as soon as the controller is attached to a scope.
    pub execute_on_attach: bool,
}

impl ControllerOptions {
    /// Set the reload policy.
    pub fn with_reload(mut self, reload: ReloadPolicy) -> Self {
        self.reload = reload;
        self
    }

    /// Enable or disable execute-on-attach.
    pub fn with_execute_on_attach(mut self, enabled: bool) -> Self {
        self.execute_on_attach = enabled;
        self
    }
}
