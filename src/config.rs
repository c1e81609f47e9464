//! Dashboard settings.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `TRACKWATCH_*` environment variables. Command line
//! overrides are applied by the binary afterwards. Once resolved into
//! [`Endpoints`], the URL set is fixed for the life of the process.
//!
//! ```toml
//! base_host = "34.234.232.11"
//! poll_interval_ms = 4000
//!
//! [endpoints.processing_stats]
//! port = 8100
//! path = "/stats"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

/// Which consistency-check contract the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyMode {
    /// GET the stored check results and render the full report.
    #[default]
    Report,
    /// POST to run a new check and render the acknowledgement.
    Update,
}

/// A single backend endpoint: an optional port plus a path on the base host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub port: Option<u16>,
    pub path: String,
}

impl Endpoint {
    fn new(path: &str) -> Self {
        Self {
            port: None,
            path: path.to_string(),
        }
    }

    /// Build the full URL for this endpoint.
    pub fn url(&self, scheme: &str, host: &str) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}{}", scheme, host, port, self.path),
            None => format!("{}://{}{}", scheme, host, self.path),
        }
    }
}

/// Per-endpoint settings, one entry per backend route the dashboard uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub processing_stats: Endpoint,
    pub analyzer_stats: Endpoint,
    pub track_gps: Endpoint,
    pub track_alerts: Endpoint,
    pub consistency_checks: Endpoint,
    pub consistency_update: Endpoint,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            processing_stats: Endpoint::new("/processing/stats"),
            analyzer_stats: Endpoint::new("/analyzer/stats"),
            track_gps: Endpoint::new("/analyzer/track/locations"),
            track_alerts: Endpoint::new("/analyzer/track/alerts"),
            consistency_checks: Endpoint::new("/consistency_check/checks"),
            consistency_update: Endpoint::new("/consistency_check/update"),
        }
    }
}

impl EndpointSettings {
    fn iter(&self) -> impl Iterator<Item = (&'static str, &Endpoint)> {
        [
            ("processing_stats", &self.processing_stats),
            ("analyzer_stats", &self.analyzer_stats),
            ("track_gps", &self.track_gps),
            ("track_alerts", &self.track_alerts),
            ("consistency_checks", &self.consistency_checks),
            ("consistency_update", &self.consistency_update),
        ]
        .into_iter()
    }
}

/// Fully resolved endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub processing_stats: String,
    pub analyzer_stats: String,
    pub track_gps: String,
    pub track_alerts: String,
    pub consistency_checks: String,
    pub consistency_update: String,
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// DNS name or IP of the deployment, optionally with a `:port` suffix.
    pub base_host: String,
    pub endpoints: EndpointSettings,
    pub poll_interval_ms: u64,
    pub error_ttl_ms: u64,
    pub request_timeout_ms: u64,
    pub consistency_mode: ConsistencyMode,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            base_host: "localhost".to_string(),
            endpoints: EndpointSettings::default(),
            poll_interval_ms: 4000,
            error_ttl_ms: 7000,
            request_timeout_ms: 10_000,
            consistency_mode: ConsistencyMode::Report,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `vars` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, vars: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("TRACKWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that cannot produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.scheme != "http" && self.scheme != "https" {
            bail!("Unsupported scheme '{}': expected http or https", self.scheme);
        }
        if self.base_host.trim().is_empty() {
            bail!("base_host must not be empty");
        }
        if self.base_host.contains('/') || self.base_host.contains(char::is_whitespace) {
            bail!("base_host '{}' must be a bare host name or IP", self.base_host);
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.error_ttl_ms == 0 {
            bail!("error_ttl_ms must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        for (name, endpoint) in self.endpoints.iter() {
            if !endpoint.path.starts_with('/') {
                bail!("endpoints.{}.path must start with '/': {}", name, endpoint.path);
            }
        }
        Ok(())
    }

    /// Resolve every endpoint against the base host.
    pub fn endpoints(&self) -> Endpoints {
        let e = &self.endpoints;
        let url = |endpoint: &Endpoint| endpoint.url(&self.scheme, &self.base_host);
        Endpoints {
            processing_stats: url(&e.processing_stats),
            analyzer_stats: url(&e.analyzer_stats),
            track_gps: url(&e.track_gps),
            track_alerts: url(&e.track_alerts),
            consistency_checks: url(&e.consistency_checks),
            consistency_update: url(&e.consistency_update),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_ttl(&self) -> Duration {
        Duration::from_millis(self.error_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
