//! Cooperative cancellation for operations.

use crate::error::{Error, Result};
use std::future::Future;
use tokio::sync::watch;

/// Owning side of a cancellation signal. Held by whoever may abort the call.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observing side of a cancellation signal, handed to the operation.
///
/// Cancellation is advisory: an operation that never looks at its signal still
/// runs to completion, its result is simply ignored by the controller.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    /// Create a new, untriggered handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Get a signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger cancellation. Repeated calls are harmless.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Return `Err(Error::Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Wait until cancellation is requested.
    ///
    /// Pends forever if the owning handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Drive `fut` to completion unless cancellation is requested first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_observed_by_all_signals() {
        let handle = CancelHandle::new();
        let first = handle.signal();
        let second = first.clone();
        assert!(!first.is_cancelled());

        handle.cancel();
        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        assert!(matches!(second.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_cancelled_wakes_waiter() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        let mut waiter = tokio_test::task::spawn(signal.cancelled());

        tokio_test::assert_pending!(waiter.poll());
        handle.cancel();
        assert!(waiter.is_woken());
        tokio_test::assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_run_returns_cancelled_when_aborted_mid_flight() {
        let handle = CancelHandle::new();
        let signal = handle.signal();

        let task = tokio::spawn(async move {
            signal
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(1)
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let signal = CancelSignal::never();
        let value = signal.run(async { Ok("done") }).await.unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        drop(handle);

        let result = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(result.is_err());
        assert!(!signal.is_cancelled());
    }
}
