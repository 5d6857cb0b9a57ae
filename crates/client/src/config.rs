//! Client configuration: where the estimation service lives and how to
//! talk to it.
//!
//! Values come from code, from `HOMEVAL_*` environment variables via
//! [`ClientConfig::apply_env`], or from a higher layer (the CLI merges a
//! TOML file and flags on top).

use std::time::Duration;

/// Service address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Global per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_BASE_URL: &str = "HOMEVAL_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "HOMEVAL_TIMEOUT_SECS";
pub const ENV_SORT_HISTORY: &str = "HOMEVAL_SORT_HISTORY";

/// How fetched history is ordered before it reaches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    /// Keep the order the service returned (most recent first by contract).
    #[default]
    Server,
    /// Stable sort by `createdAt`, newest first.
    NewestFirst,
}

/// Errors while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL '{url}' must start with http:// or https://")]
    InvalidBaseUrl { url: String },

    #[error("invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("could not read '{path}': {message}")]
    Read { path: String, message: String },

    #[error("could not parse '{path}': {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    pub timeout: Duration,
    pub history_order: HistoryOrder,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            history_order: HistoryOrder::Server,
        }
    }
}

impl ClientConfig {
    /// Create a config for the service at `base_url`, other settings default.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::default().with_base_url(base_url)
    }

    /// Read `HOMEVAL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_order(mut self, order: HistoryOrder) -> Self {
        self.history_order = order;
        self
    }

    /// Overlay values found through `lookup` (normally `std::env::var`).
    ///
    /// Unset variables leave the current value alone. Empty values count as
    /// unset.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self = self.with_base_url(&url)?;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.timeout = Duration::from_secs(parse_secs(ENV_TIMEOUT_SECS, &secs)?);
        }
        if let Some(flag) = get(ENV_SORT_HISTORY) {
            self.history_order = if parse_bool(ENV_SORT_HISTORY, &flag)? {
                HistoryOrder::NewestFirst
            } else {
                HistoryOrder::Server
            };
        }
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL.
    ///
    /// `predict` → `{base_url}/predict`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Parse a whole number of seconds, rejecting zero.
pub fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| invalid(key, value, &e.to_string()))?;
    check_secs(key, secs)
}

/// Reject a zero timeout read from an already-typed source.
pub fn check_secs(key: &str, secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(invalid(key, "0", "timeout must be at least 1 second"));
    }
    Ok(secs)
}

/// Parse `true/false/1/0/yes/no` (case-insensitive).
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn invalid(key: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
