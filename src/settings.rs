//! Layered configuration.
//!
//! Settings come from an optional TOML file, overridden by environment
//! variables prefixed with `MEDISURGE_` (nested keys separated by `__`):
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout = "10s"
//!
//! [refresh]
//! dashboard = "30s"
//! agents = "15s"
//! metrics = "once"
//! timeline = "once"
//! ```
//!
//! e.g. `MEDISURGE_REFRESH__AGENTS=5s` polls agents every five seconds.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::poll::{Cadence, PolicySet, RefreshPolicy};
use crate::source::{Domain, HttpSource, DEFAULT_BASE_URL};

const ENV_PREFIX: &str = "MEDISURGE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub refresh: RefreshSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request timeout, e.g. `"10s"`.
    pub timeout: String,
}

/// Cadence per domain: a duration, or `"once"` to fetch on mount only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub dashboard: String,
    pub agents: String,
    pub metrics: String,
    pub timeline: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: "10s".to_string(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            dashboard: "30s".to_string(),
            agents: "15s".to_string(),
            metrics: "once".to_string(),
            timeline: "once".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus `MEDISURGE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(&self.api.timeout)
            .with_context(|| format!("Invalid api.timeout: {}", self.api.timeout))
    }

    /// Refresh policies for a view.
    pub fn policies(&self) -> Result<PolicySet> {
        let entries = [
            (Domain::Dashboard, &self.refresh.dashboard),
            (Domain::Agents, &self.refresh.agents),
            (Domain::Metrics, &self.refresh.metrics),
            (Domain::Timeline, &self.refresh.timeline),
        ];

        let mut set = PolicySet::empty();
        for (domain, raw) in entries {
            let cadence = Cadence::parse(raw)
                .with_context(|| format!("Invalid refresh.{}: {}", domain, raw))?;
            set = set.with(domain, RefreshPolicy { cadence });
        }
        Ok(set)
    }

    /// Build the HTTP source described by `[api]`.
    pub fn http_source(&self) -> Result<HttpSource> {
        let source = HttpSource::builder()
            .base_url(self.api.base_url.clone())
            .timeout(self.request_timeout()?)
            .build()?;
        Ok(source)
    }
}
