//! The request state controller.

use super::{CancelHandle, ControllerOptions, Operation, RequestState, RequestToken};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// The request currently allowed to resolve into state.
struct InFlight {
    token: RequestToken,
    cancel: CancelHandle,
}

/// Runs one kind of asynchronous operation and tracks its state.
///
/// Every call to [`execute`](Self::execute) gets a fresh token; only the most
/// recently issued call may ever change state. Earlier calls are signalled to
/// cancel and their results, whenever they arrive, are dropped.
///
/// Cloning yields another handle to the same controller.
pub struct RequestController<A, T> {
    name: Arc<str>,
    operation: Arc<dyn Operation<A, T>>,
    options: ControllerOptions,
    state: Arc<watch::Sender<RequestState<T>>>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl<A, T> Clone for RequestController<A, T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            operation: Arc::clone(&self.operation),
            options: self.options,
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A, T> std::fmt::Debug for RequestController<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RequestController")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("status", &state.status())
            .field("token", &state.token())
            .finish()
    }
}

impl<A, T> RequestController<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller for `operation`. `name` labels its log events.
    pub fn new<O>(name: impl Into<String>, operation: O, options: ControllerOptions) -> Self
    where
        O: Operation<A, T> + 'static,
    {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            name: Arc::from(name.into()),
            operation: Arc::new(operation),
            options,
            state: Arc::new(state),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller options.
    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    /// Issue a new request, superseding any request still in flight.
    ///
    /// Returns immediately; observe the outcome through [`state`](Self::state),
    /// [`subscribe`](Self::subscribe) or [`settled`](Self::settled). Must be
    /// called from within a Tokio runtime.
    pub fn execute(&self, args: A) -> RequestToken {
        let policy = self.options.reload;
        let cancel = CancelHandle::new();
        let signal = cancel.signal();

        let token = {
            let mut slot = self.lock_in_flight();
            let mut token = RequestToken::INITIAL;
            self.state.send_modify(|state| token = state.begin(policy));

            if let Some(previous) = slot.replace(InFlight { token, cancel }) {
                debug!(
                    controller = %self.name,
                    superseded = %previous.token,
                    by = %token,
                    "Superseding in-flight request"
                );
                previous.cancel.cancel();
            }
            token
        };

        debug!(controller = %self.name, %token, "Executing request");

        let name = Arc::clone(&self.name);
        let operation = Arc::clone(&self.operation);
        let state = Arc::clone(&self.state);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let outcome = operation.run(args, signal).await;

            {
                let mut slot = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.as_ref().is_some_and(|f| f.token == token) {
                    slot.take();
                }
            }

            let failure = outcome.as_ref().err().map(ToString::to_string);
            let cancelled = outcome.as_ref().is_err_and(|e| e.is_cancelled());

            if !state.send_if_modified(|s| s.resolve(token, outcome, policy)) {
                debug!(controller = %name, %token, "Discarding stale result");
                return;
            }

            match failure {
                None => debug!(controller = %name, %token, "Request succeeded"),
                Some(_) if cancelled => info!(controller = %name, %token, "Request cancelled"),
                Some(error) => warn!(controller = %name, %token, %error, "Request failed"),
            }
        });

        token
    }

    /// Abort the in-flight request, if any.
    ///
    /// State moves to `Cancelled` immediately; the operation is signalled and
    /// whatever it eventually returns is ignored. A no-op when idle.
    pub fn cancel(&self) {
        let mut slot = self.lock_in_flight();
        let Some(in_flight) = slot.take() else {
            return;
        };

        in_flight.cancel.cancel();
        let token = in_flight.token;
        let policy = self.options.reload;
        if self.state.send_if_modified(|s| s.abort(token, policy)) {
            info!(controller = %self.name, %token, "Request cancelled");
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// State changes as a stream, starting with the current snapshot.
    pub fn updates(&self) -> WatchStream<RequestState<T>> {
        WatchStream::new(self.subscribe())
    }

    /// Wait until no request is in flight and return that state.
    pub async fn settled(&self) -> RequestState<T> {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|s| s.status().is_settled())
            .await
            .map(|s| s.clone());
        // The sender lives as long as `self`, so the wait cannot fail.
        settled.unwrap_or_else(|_| self.state())
    }

    /// Bind the controller to a consuming scope.
    ///
    /// Executes immediately when `execute_on_attach` is set. Dropping the
    /// returned guard detaches.
    pub fn attach(&self, args: A) -> Attachment<A, T> {
        if self.options.execute_on_attach {
            self.execute(args);
        }
        debug!(controller = %self.name, "Attached");
        Attachment {
            controller: self.clone(),
        }
    }

    /// Scope teardown: cancels any in-flight request.
    pub fn detach(&self) {
        debug!(controller = %self.name, "Detached");
        self.cancel();
    }

    /// Patch loaded data locally without issuing a request.
    ///
    /// Returns false if there is no data. The token is untouched, so an
    /// in-flight request still overwrites the patch when it resolves.
    pub fn mutate(&self, f: impl FnOnce(&mut T)) -> bool {
        self.state.send_if_modified(|s| s.mutate(f))
    }

    /// Replace data locally without issuing a request.
    pub fn set_data(&self, value: T) {
        self.state.send_modify(|s| s.set_data(value));
    }

    /// Cancel anything in flight and return to `Idle`.
    pub fn reset(&self) {
        let mut slot = self.lock_in_flight();
        if let Some(in_flight) = slot.take() {
            in_flight.cancel.cancel();
        }
        self.state.send_if_modified(RequestState::reset);
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard tying a controller to a scope. Detaches on drop.
#[must_use = "dropping the attachment detaches the controller immediately"]
pub struct Attachment<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    controller: RequestController<A, T>,
}

impl<A, T> Attachment<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// The attached controller.
    pub fn controller(&self) -> &RequestController<A, T> {
        &self.controller
    }
}

impl<A, T> Drop for Attachment<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.controller.detach();
    }
}
