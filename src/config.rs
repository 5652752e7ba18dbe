//! Client configuration
//!
//! Configuration is resolved once at startup, in increasing precedence:
//! built-in defaults, a YAML file, the process environment (including a
//! `.env` file), and finally explicit builder / CLI overrides.
//!
//! ```yaml
//! base_url: https://events.example.com/api/
//! timeout_seconds: 15
//! coalesce_refresh: true
//! headers:
//!   X-Client: eventdesk
//! ```

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "EVENTDESK_API_URL";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "EVENTDESK_TIMEOUT_SECS";

/// Refresh endpoint, relative to the base URL
pub const DEFAULT_REFRESH_PATH: &str = "token/refresh/";

/// Route the user is sent to after session teardown
pub const DEFAULT_ENTRY_ROUTE: &str = "/";

const APP_NAME: &str = "eventdesk";
const SESSION_FILE: &str = "session.json";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all relative paths are joined onto
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Refresh endpoint, relative to `base_url`
    pub refresh_path: String,
    /// Route passed to the navigator on session teardown
    pub entry_route: String,
    /// Serialize concurrent refreshes so a burst of 401s costs one refresh call
    pub coalesce_refresh: bool,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("eventdesk-client/{}", env!("CARGO_PKG_VERSION")),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            entry_route: DEFAULT_ENTRY_ROUTE.to_string(),
            coalesce_refresh: true,
            default_headers,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolve config from the environment, loading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using the given lookup
    ///
    /// Blank values are treated as unset so an empty `EVENTDESK_API_URL`
    /// falls back to the configured base URL.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(TIMEOUT_ENV, format!("not a number: {raw}")))?;
            self.timeout = Duration::from_secs(secs);
        }

        self.validate()?;
        Ok(self)
    }

    /// Parse config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        let config = file.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Check the config is usable
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.refresh_path.starts_with("http://") || self.refresh_path.starts_with("https://") {
            Url::parse(&self.refresh_path)?;
        }
        if !self.entry_route.starts_with('/') {
            return Err(Error::invalid_value(
                "entry_route",
                "must be an absolute route starting with '/'",
            ));
        }
        Ok(())
    }

    /// Join a path onto the base URL; absolute URLs pass through
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Full URL of the refresh endpoint
    pub fn refresh_url(&self) -> String {
        self.resolve(&self.refresh_path)
    }

    /// Default location of the persisted session file
    pub fn default_session_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| Error::config("Could not find local data directory"))?;
        Ok(data_dir.join(APP_NAME).join(SESSION_FILE))
    }
}

/// On-disk YAML representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    refresh_path: Option<String>,
    #[serde(default)]
    entry_route: Option<String>,
    #[serde(default)]
    coalesce_refresh: Option<bool>,
    #[serde(default)]
    headers: HashMap<String, String>,
}

impl ConfigFile {
    fn into_config(self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(secs) = self.timeout_seconds {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = self.user_agent {
            config.user_agent = agent;
        }
        if let Some(path) = self.refresh_path {
            config.refresh_path = path;
        }
        if let Some(route) = self.entry_route {
            config.entry_route = route;
        }
        if let Some(coalesce) = self.coalesce_refresh {
            config.coalesce_refresh = coalesce;
        }
        config.default_headers.extend(self.headers);
        config
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.config.refresh_path = path.into();
        self
    }

    /// Set the route used after session teardown
    pub fn entry_route(mut self, route: impl Into<String>) -> Self {
        self.config.entry_route = route.into();
        self
    }

    /// Enable or disable refresh coalescing
    pub fn coalesce_refresh(mut self, enabled: bool) -> Self {
        self.config.coalesce_refresh = enabled;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
