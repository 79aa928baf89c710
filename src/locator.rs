//! Logical service name to base URL resolution.
//!
//! Each backend is addressed by a logical name (`catalogue`, `featurestore`,
//! `metricstore`, `kafka_connect`, `kafka_schema_registry`). The base URL is
//! chosen in this order:
//!
//! 1. the environment variable `MASTRO_{NAME}_URL` (name upper-cased),
//! 2. the `[services]` table of the config file,
//! 3. the logical name itself, which doubles as a hostname inside a
//!    container network.
//!
//! The environment is captured once into the locator so resolution stays a
//! pure lookup.

use std::collections::{BTreeMap, HashMap};

use crate::config::Config;

pub const CATALOGUE: &str = "catalogue";
pub const FEATURESTORE: &str = "featurestore";
pub const METRICSTORE: &str = "metricstore";
pub const KAFKA_CONNECT: &str = "kafka_connect";
pub const KAFKA_SCHEMA_REGISTRY: &str = "kafka_schema_registry";

/// All logical services the dashboard talks to.
pub const SERVICES: [&str; 5] = [
    CATALOGUE,
    FEATURESTORE,
    METRICSTORE,
    KAFKA_CONNECT,
    KAFKA_SCHEMA_REGISTRY,
];

const ENV_PREFIX: &str = "MASTRO_";
const ENV_SUFFIX: &str = "_URL";

/// Environment variable consulted for `service`.
pub fn override_key(service: &str) -> String {
    format!("{}{}{}", ENV_PREFIX, service.to_uppercase(), ENV_SUFFIX)
}

/// Where a resolved URL came from. Shown by `mastro services`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Environment,
    Config,
    LogicalName,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Environment => "env",
            Origin::Config => "config",
            Origin::LogicalName => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceLocator {
    env: HashMap<String, String>,
    configured: BTreeMap<String, String>,
}

impl ServiceLocator {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::with_env(std::env::vars())
    }

    pub fn with_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            configured: BTreeMap::new(),
        }
    }

    /// Layer the `[services]` table of `config` under the environment.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.configured = config.services.clone();
        self
    }

    pub fn resolve(&self, service: &str) -> String {
        self.resolve_with_origin(service).0
    }

    pub fn resolve_with_origin(&self, service: &str) -> (String, Origin) {
        if let Some(url) = self
            .env
            .get(&override_key(service))
            .filter(|v| !v.trim().is_empty())
        {
            return (trim_slash(url), Origin::Environment);
        }
        if let Some(url) = self.configured.get(service) {
            return (trim_slash(url), Origin::Config);
        }
        (service.to_string(), Origin::LogicalName)
    }
}

fn trim_slash(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
