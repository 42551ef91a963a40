//! Request state snapshots and their transitions.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Nothing issued yet (or reset).
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request produced data.
    Succeeded,
    /// The latest request failed.
    Failed,
    /// The latest request was aborted. Not an error to show.
    Cancelled,
}

impl RequestStatus {
    /// Whether no request is in flight.
    pub fn is_settled(self) -> bool {
        self != Self::Loading
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Identifies one `execute` call on a controller. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The token of a controller that has never executed.
    pub const INITIAL: Self = Self(0);

    /// The token following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happens to previously loaded data when a new request starts or ends
/// without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// Drop old data as soon as a reload starts, and on failure or cancel.
    #[default]
    ClearOnReload,
    /// Keep the last successful data visible until replaced.
    StaleWhileRevalidate,
}

/// Snapshot of a controller's request state.
#[derive(Debug, Clone)]
pub struct RequestState<T> {
    status: RequestStatus,
    data: Option<T>,
    error: Option<Arc<Error>>,
    token: RequestToken,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            data: None,
            error: None,
            token: RequestToken::INITIAL,
            updated_at: None,
        }
    }
}

impl<T> RequestState<T> {
    /// Current status.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Loaded data, if any.
    ///
    /// Outside `Succeeded` this is only present under
    /// [`ReloadPolicy::StaleWhileRevalidate`] and is the last good value.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Take ownership of the loaded data.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// The failure, present only when `Failed`.
    pub fn error(&self) -> Option<&Arc<Error>> {
        self.error.as_ref()
    }

    /// Token of the latest issued request.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// When a request last resolved into this state.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Loading with nothing to show yet.
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading() && self.data.is_none()
    }

    /// Whether a consumer should render an error with a retry affordance.
    pub fn should_show_error(&self) -> bool {
        self.status == RequestStatus::Failed
    }

    /// Start a new request, returning its token.
    pub(crate) fn begin(&mut self, policy: ReloadPolicy) -> RequestToken {
        self.token = self.token.next();
        self.status = RequestStatus::Loading;
        self.error = None;
        if policy == ReloadPolicy::ClearOnReload {
            self.data = None;
        }
        self.token
    }

    /// Whether `token` identifies the request currently in flight.
    pub(crate) fn is_current(&self, token: RequestToken) -> bool {
        self.token == token && self.status == RequestStatus::Loading
    }

    /// Apply the outcome of the request identified by `token`.
    ///
    /// Returns false, leaving state untouched, if the outcome is stale.
    pub(crate) fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<T>,
        policy: ReloadPolicy,
    ) -> bool {
        if !self.is_current(token) {
            return false;
        }

        match outcome {
            Ok(value) => {
                self.status = RequestStatus::Succeeded;
                self.data = Some(value);
                self.error = None;
            }
            Err(err) if err.is_cancelled() => {
                self.status = RequestStatus::Cancelled;
                self.error = None;
                self.clear_data_for(policy);
            }
            Err(err) => {
                self.status = RequestStatus::Failed;
                self.error = Some(Arc::new(err));
                self.clear_data_for(policy);
            }
        }
        self.updated_at = Some(Utc::now());
        true
    }

    /// Abort the request identified by `token` if it is still in flight.
    pub(crate) fn abort(&mut self, token: RequestToken, policy: ReloadPolicy) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.status = RequestStatus::Cancelled;
        self.error = None;
        self.clear_data_for(policy);
        self.updated_at = Some(Utc::now());
        true
    }

    /// Go back to `Idle`. The token is kept so in-flight results stay stale.
    pub(crate) fn reset(&mut self) -> bool {
        let changed = self.status != RequestStatus::Idle || self.data.is_some();
        self.status = RequestStatus::Idle;
        self.data = None;
        self.error = None;
        self.updated_at = None;
        changed
    }

    /// Edit present data in place.
    pub(crate) fn mutate(&mut self, f: impl FnOnce(&mut T)) -> bool {
        match self.data.as_mut() {
            Some(data) => {
                f(data);
                true
            }
            None => false,
        }
    }

    /// Replace data locally. Settled non-success states become `Succeeded`.
    pub(crate) fn set_data(&mut self, value: T) {
        self.data = Some(value);
        if self.status != RequestStatus::Loading {
            self.status = RequestStatus::Succeeded;
            self.error = None;
        }
    }

    fn clear_data_for(&mut self, policy: ReloadPolicy) {
        if policy == ReloadPolicy::ClearOnReload {
            self.data = None;
        }
    }
}
