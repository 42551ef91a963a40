//! Explicit authentication context for backend calls.

use crate::config::{CredentialConfig, CredentialKind};
use crate::error::{Error, Result};
use reqwest::RequestBuilder;
use reqwest::header::COOKIE;
use secrecy::{ExposeSecret, SecretString};

/// How requests authenticate.
#[derive(Debug, Default)]
pub enum Credential {
    /// Unauthenticated; only public endpoints will succeed.
    #[default]
    Anonymous,
    /// `Authorization: Bearer <token>`.
    Bearer(SecretString),
    /// A raw `Cookie` header value, e.g. `session=...`.
    Cookie(SecretString),
}

/// Who is calling the backend. Passed to the client at construction.
#[derive(Debug, Default)]
pub struct Session {
    credential: Credential,
}

impl Session {
    /// A session without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session authenticated with a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::Bearer(SecretString::from(token.into())),
        }
    }

    /// A session authenticated with a cookie header value.
    pub fn cookie(value: impl Into<String>) -> Self {
        Self {
            credential: Credential::Cookie(SecretString::from(value.into())),
        }
    }

    /// Build a session from configuration, reading the secret from the
    /// configured environment variable.
    pub fn from_config(config: &CredentialConfig) -> Result<Self> {
        if config.kind == CredentialKind::None {
            return Ok(Self::anonymous());
        }

        let secret = std::env::var(&config.env_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::auth(format!(
                    "{} credential expected in ${}",
                    config.kind, config.env_var
                ))
            })?;

        Ok(match config.kind {
            CredentialKind::Bearer => Self::bearer(secret.trim()),
            CredentialKind::Cookie => Self::cookie(secret.trim()),
            CredentialKind::None => Self::anonymous(),
        })
    }

    /// Whether requests carry credentials.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self.credential, Credential::Anonymous)
    }

    /// Attach credentials to an outgoing request.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Credential::Anonymous => request,
            Credential::Bearer(token) => request.bearer_auth(token.expose_secret()),
            Credential::Cookie(value) => request.header(COOKIE, value.expose_secret()),
        }
    }
}
