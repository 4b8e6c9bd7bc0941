use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration: lookup tuning plus one optional section per
/// portal. Sections left out of the file are simply not registered.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Per-batch deadline; sources still running when it elapses are
    /// reported as timed out.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    /// Request timeout for the shared HTTP client.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

fn default_deadline_ms() -> u64 {
    10_000
}

fn default_http_timeout_ms() -> u64 {
    8_000
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

/// Connection details for one portal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    pub illinois: Option<PortalConfig>,
    pub nebraska_campus: Option<PortalConfig>,
    pub lincoln_city: Option<PortalConfig>,
    pub ohio_state: Option<PortalConfig>,
    pub iowa_dot: Option<PortalConfig>,
    pub madison_court: Option<PortalConfig>,
}

impl AppConfig {
    /// Loads configuration from the given TOML file, then applies
    /// `CITESCAN_*` environment overrides (`CITESCAN_LOOKUP__DEADLINE_MS`,
    /// `CITESCAN_SOURCES__ILLINOIS__API_KEY`, ...).
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("CITESCAN").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
