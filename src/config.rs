//! TOML configuration for the dashboard.
//!
//! Every section is optional. A missing file at the default path falls back
//! to [`Config::default`], which resolves each service through environment
//! overrides or its logical name (see [`crate::locator`]).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Static base URLs per logical service name, consulted after the
    /// environment overrides.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Default page sizes, one per list store.
#[derive(Debug, Deserialize, Clone)]
pub struct PagingConfig {
    #[serde(default = "default_search_limit")]
    pub search: usize,
    #[serde(default = "default_search_limit")]
    pub featuresets: usize,
    #[serde(default = "default_search_limit")]
    pub metricsets: usize,
    #[serde(default = "default_connectors_limit")]
    pub connectors: usize,
    #[serde(default = "default_schemas_limit")]
    pub schemas: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            search: default_search_limit(),
            featuresets: default_search_limit(),
            metricsets: default_search_limit(),
            connectors: default_connectors_limit(),
            schemas: default_schemas_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    8
}
fn default_connectors_limit() -> usize {
    4
}
fn default_schemas_limit() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Load `path` if it exists, otherwise use the defaults.
///
/// Only a missing file is tolerated; a file that exists but fails to parse
/// or validate is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    let paging = &config.paging;
    for (name, limit) in [
        ("search", paging.search),
        ("featuresets", paging.featuresets),
        ("metricsets", paging.metricsets),
        ("connectors", paging.connectors),
        ("schemas", paging.schemas),
    ] {
        if limit == 0 {
            anyhow::bail!("paging.{} must be > 0", name);
        }
    }

    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be > 0");
    }

    for (name, url) in &config.services {
        if url.trim().is_empty() {
            anyhow::bail!("services.{} must not be empty", name);
        }
    }

    Ok(())
}
