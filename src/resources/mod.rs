//! Typed request controllers for each backend resource.
//!
//! Every constructor here is the same pattern with a different endpoint and
//! payload: build an [`ApiRequest`] from the call arguments, send it through
//! the [`Backend`], decode the payload and convert it into a model.

mod billing;
mod campaigns;
mod developer;

use crate::api::{ApiRequest, Backend};
use crate::error::Result;
use crate::request::{CancelSignal, ControllerOptions, RequestController};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Factory for resource controllers sharing one backend and one set of
/// controller options.
#[derive(Clone)]
pub struct Resources {
    backend: Arc<dyn Backend>,
    options: ControllerOptions,
}

impl Resources {
    /// Create a factory over `backend`.
    pub fn new(backend: Arc<dyn Backend>, options: ControllerOptions) -> Self {
        Self { backend, options }
    }

    /// Options applied to every controller.
    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    /// Same factory with different controller options.
    pub fn with_options(&self, options: ControllerOptions) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            options,
        }
    }

    /// Build a controller for one endpoint.
    ///
    /// `request` turns call arguments into a request (and may reject them);
    /// `convert` maps the decoded payload `P` into the model `T`.
    fn controller<A, P, T, R, C>(&self, name: &str, request: R, convert: C) -> RequestController<A, T>
    where
        A: Send + 'static,
        P: DeserializeOwned + Send + 'static,
        T: Clone + Send + Sync + 'static,
        R: Fn(A) -> Result<ApiRequest> + Send + Sync + 'static,
        C: Fn(P) -> T + Send + Sync + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let convert = Arc::new(convert);

        let operation = move |args: A, signal: CancelSignal| {
            let backend = Arc::clone(&backend);
            let convert = Arc::clone(&convert);
            let request = request(args);
            async move {
                let value = backend.call(request?, signal).await?;
                let payload: P = serde_json::from_value(value)?;
                Ok(convert(payload))
            }
        };

        RequestController::new(name, operation, self.options)
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::error::Error;
    use crate::request::RequestStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_argument_rejection_never_reaches_backend() {
        let mut backend = MockBackend::new();
        backend.expect_call().never();

        let resources = Resources::new(Arc::new(backend), ControllerOptions::default());
        let controller: RequestController<i32, i32> = resources.controller(
            "checked",
            |n: i32| {
                if n < 0 {
                    Err(Error::invalid_input("negative"))
                } else {
                    Ok(ApiRequest::get("/n"))
                }
            },
            |n: i32| n,
        );

        controller.execute(-1);
        let state = controller.settled().await;
        assert_eq!(state.status(), RequestStatus::Failed);
        assert!(matches!(
            state.error().map(|e| e.as_ref()),
            Some(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_undecodable_payload_fails() {
        let mut backend = MockBackend::new();
        backend
            .expect_call()
            .returning(|_, _| Ok(json!({"unexpected": true})));

        let resources = Resources::new(Arc::new(backend), ControllerOptions::default());
        let controller: RequestController<(), Vec<u32>> =
            resources.controller("numbers", |_| Ok(ApiRequest::get("/n")), |n: Vec<u32>| n);

        controller.execute(());
        let state = controller.settled().await;
        assert_eq!(state.status(), RequestStatus::Failed);
        assert!(matches!(
            state.error().map(|e| e.as_ref()),
            Some(Error::Serialization(_))
        ));
    }
}
