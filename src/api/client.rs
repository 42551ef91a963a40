//! REST backend client.

use super::Session;
use super::payloads::ErrorPayload;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::request::CancelSignal;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// One JSON request to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    /// A POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// A DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

/// The remote collaborator every resource talks to.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send `request`, returning the decoded JSON body (`Null` when empty).
    ///
    /// Fails with `Error::Api` for non-success statuses, `Error::Network` for
    /// transport failures and `Error::Cancelled` once `signal` fires.
    async fn call(&self, request: ApiRequest, signal: CancelSignal) -> Result<Value>;
}

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: ApiConfig,
    session: Session,
}

impl ApiClientBuilder {
    /// Create a new builder with default config and no credentials.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
            session: Session::anonymous(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the session used to authenticate requests.
    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        ApiClient::new(self.config, self.session)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON-over-HTTPS client for the dashboard backend.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiConfig, session: Session) -> Result<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(Error::config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            config,
            http,
            session,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Check if requests carry credentials.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn call(&self, request: ApiRequest, signal: CancelSignal) -> Result<Value> {
        signal.check()?;

        let mut builder = self
            .session
            .authorize(self.http.request(request.method.clone(), self.url(&request.path)));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, "Sending request");

        signal
            .run(async move {
                let response = builder.send().await?;
                read_body(response).await
            })
            .await
    }
}

/// Decode a response body, turning non-success statuses into `Error::Api`.
async fn read_body(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(Error::api(status.as_u16(), error_message(status, &body)));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body)
        .map_err(|e| Error::application(format!("Malformed response body: {e}")))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Some(message) = serde_json::from_slice::<ErrorPayload>(body)
        .ok()
        .and_then(ErrorPayload::into_message)
    {
        return message;
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CancelHandle;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, session: Session) -> ApiClient {
        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        ApiClientBuilder::new()
            .config(config)
            .session(session)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_bearer_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/protected/billing/prices"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"price_id": "p1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Session::bearer("t0k"));
        let value = client
            .call(
                ApiRequest::get("/api/protected/billing/prices"),
                CancelSignal::never(),
            )
            .await
            .unwrap();

        assert_eq!(value, json!([{"price_id": "p1"}]));
    }

    #[tokio::test]
    async fn test_post_sends_json_body_and_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/campaigns"))
            .and(header("cookie", "session=abc"))
            .and(body_json(json!({"name": "Launch", "slug": "launch"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Session::cookie("session=abc"));
        let request =
            ApiRequest::post("/api/v1/campaigns", &json!({"name": "Launch", "slug": "launch"}))
                .unwrap();
        let value = client.call(request, CancelSignal::never()).await.unwrap();

        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/webhooks/abc"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let value = client
            .call(ApiRequest::delete("api/v1/webhooks/abc"), CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_application_error_message_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/campaigns"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"error": "rate limited"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let err = client
            .call(ApiRequest::get("/api/v1/campaigns"), CancelSignal::never())
            .await
            .unwrap_err();

        match err {
            Error::Api { status, ref message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded\n"))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let err = client
            .call(ApiRequest::get("/anything"), CancelSignal::never())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "upstream exploded");
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let err = client
            .call(ApiRequest::get("/missing"), CancelSignal::never())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Not Found");
    }

    #[tokio::test]
    async fn test_cancellation_aborts_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let handle = CancelHandle::new();
        let signal = handle.signal();

        let call = tokio::spawn(async move {
            client
                .call(ApiRequest::get("/api/v1/webhooks"), signal)
                .await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), call)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_already_cancelled_signal_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let handle = CancelHandle::new();
        handle.cancel();

        let result = client
            .call(ApiRequest::get("/api/v1/webhooks"), handle.signal())
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..ApiConfig::default()
        };
        let client = ApiClient::new(config, Session::anonymous()).unwrap();

        let err = client
            .call(ApiRequest::get("/api/v1/campaigns"), CancelSignal::never())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_slow_response_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 1,
            ..ApiConfig::default()
        };
        let client = ApiClient::new(config, Session::anonymous()).unwrap();

        let err = client
            .call(ApiRequest::get("/api/v1/campaigns"), CancelSignal::never())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)), "unexpected error: {err:?}");
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_application_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::anonymous());
        let err = client
            .call(ApiRequest::get("/api/v1/campaigns"), CancelSignal::never())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Application(_)), "unexpected error: {err:?}");
        assert!(err.to_string().starts_with("Malformed response body:"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = ApiConfig {
            base_url: "ftp://example.com".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            ApiClient::new(config, Session::anonymous()),
            Err(Error::Config(_))
        ));
    }
}
