//! Configuration settings for reqstate.

use crate::request::{ControllerOptions, ReloadPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides, e.g. `REQSTATE__API__BASE_URL`.
pub const ENV_PREFIX: &str = "REQSTATE";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// Request controller behaviour.
    pub controller: ControllerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from a TOML file layered under environment
    /// overrides. A missing file is not an error.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);

        let settings = config::Config::builder()
            .add_source(
                config::File::from(config_path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| Path::new("config.toml").to_path_buf())
}

/// API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Where the credential comes from.
    pub credential: CredentialConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            user_agent: concat!("reqstate/", env!("CARGO_PKG_VERSION")).to_string(),
            credential: CredentialConfig::default(),
        }
    }
}

/// Credential kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// No credentials.
    None,
    /// Bearer token.
    #[default]
    Bearer,
    /// Session cookie.
    Cookie,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Bearer => write!(f, "bearer"),
            Self::Cookie => write!(f, "cookie"),
        }
    }
}

/// Credential source. The secret itself never lives in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Kind of credential.
    pub kind: CredentialKind,
    /// Environment variable holding the token or cookie value.
    pub env_var: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            kind: CredentialKind::Bearer,
            env_var: "REQSTATE_API_TOKEN".to_string(),
        }
    }
}

/// Request controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Keep or clear old data while reloading.
    pub reload: ReloadPolicy,
    /// Start fetching as soon as a controller is attached.
    pub execute_on_attach: bool,
    /// Re-issue requests every N seconds in watch mode (0 to disable).
    pub watch_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reload: ReloadPolicy::ClearOnReload,
            execute_on_attach: true,
            watch_secs: 0,
        }
    }
}

impl ControllerConfig {
    /// Options for controllers built from this configuration.
    pub fn options(&self) -> ControllerOptions {
        ControllerOptions::default()
            .with_reload(self.reload)
            .with_execute_on_attach(self.execute_on_attach)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Also write logs to a daily rolling file in the log directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "reqstate=info".to_string(),
            file: false,
        }
    }
}
