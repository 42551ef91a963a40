//! The unit of work a controller manages.

use super::CancelSignal;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// An asynchronous operation against a remote collaborator.
///
/// Implementations should return `Error::Cancelled` promptly once `signal`
/// fires, but are not required to: a controller discards late results by
/// token either way.
#[async_trait]
pub trait Operation<A, T>: Send + Sync {
    /// Run the operation once with the given arguments.
    async fn run(&self, args: A, signal: CancelSignal) -> Result<T>;
}

#[async_trait]
impl<A, T, F, Fut> Operation<A, T> for F
where
    A: Send + 'static,
    T: Send + 'static,
    F: Fn(A, CancelSignal) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    async fn run(&self, args: A, signal: CancelSignal) -> Result<T> {
        (self)(args, signal).await
    }
}
