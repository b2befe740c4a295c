//! Configuration types for Wallflow.
//!
//! Configuration is read from a single TOML file (`wallflow.toml` by default,
//! or the path in `WALLFLOW_CONFIG`). Every section and field has a default,
//! so an absent file or an empty one yields a working setup.

pub mod feed;
pub mod layout;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use feed::FeedConfig;
pub use layout::LayoutConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "WALLFLOW_CONFIG";

/// Environment variable overriding `server.bind`.
pub const BIND_ENV: &str = "WALLFLOW_BIND";

/// Complete Wallflow configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallflowConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Session settings for the auth gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long a login session stays valid.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

fn default_cookie_name() -> String {
    "wallflow_session".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            cookie_name: default_cookie_name(),
        }
    }
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-lifetime maps; nothing survives a restart.
    #[default]
    Memory,
    /// JSON Lines journal replayed on startup.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Journal path (file backend only).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/wallflow.jsonl")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WallflowConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location is not an error; an explicitly
    /// named file must exist. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let p = config_path();
                if p.exists() {
                    Self::from_file(&p)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var(BIND_ENV) {
            let bind = bind.trim();
            if !bind.is_empty() {
                self.server.bind = bind.to_string();
            }
        }
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feed.validate()?;
        self.layout.validate()?;
        if self.auth.session_ttl_secs == 0 {
            return Err(ConfigError::Config(
                "auth.session_ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from("wallflow.toml")
}
