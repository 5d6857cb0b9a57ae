//! Layered client configuration for the `homeval` binary.
//!
//! Precedence, highest first: command-line flags, `HOMEVAL_*` environment
//! variables, the TOML file given with `--config`, built-in defaults.
//!
//! # Example
//!
//! ```toml
//! [service]
//! base_url = "https://estimates.example.com"
//! timeout_secs = 5
//! sort_history = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use homeval_client::config::check_secs;
use homeval_client::{ClientConfig, ConfigError, HistoryOrder};
use serde::Deserialize;

/// Top-level config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    service: ServiceSection,
}

/// `[service]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceSection {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    sort_history: Option<bool>,
}

/// Values given on the command line.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub sort_history: bool,
}

/// Build the client configuration from every layer.
pub(crate) fn resolve<F>(overrides: &Overrides, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(path) = &overrides.config {
        config = apply_file(config, read_file(path)?.service)?;
    }

    config = config.apply_env(env)?;

    if let Some(url) = &overrides.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(secs) = overrides.timeout_secs {
        let secs = check_secs("--timeout-secs", secs)?;
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if overrides.sort_history {
        config = config.with_history_order(HistoryOrder::NewestFirst);
    }

    Ok(config)
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn apply_file(mut config: ClientConfig, section: ServiceSection) -> Result<ClientConfig, ConfigError> {
    if let Some(url) = section.base_url {
        config = config.with_base_url(&url)?;
    }
    if let Some(secs) = section.timeout_secs {
        let secs = check_secs("service.timeout_secs", secs)?;
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(sort) = section.sort_history {
        config = config.with_history_order(if sort {
            HistoryOrder::NewestFirst
        } else {
            HistoryOrder::Server
        });
    }
    Ok(config)
}
