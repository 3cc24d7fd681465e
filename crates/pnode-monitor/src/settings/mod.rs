pub mod validation;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr, path::Path, time::Duration};
use url::Url;
use validation::validate_config;
use xandeum_prpc_client::{
    CacheWindows, EndpointRegistry, Timeouts,
    registry::{CACHE_TTL, DEFAULT_TIMEOUT, HEALTH_CHECK_TIMEOUT, PNODE_ENDPOINTS, STALE_AFTER},
};

/// Refresh cadences the dashboard offers, in seconds.
pub const ALLOWED_POLL_INTERVALS: [u64; 4] = [30, 60, 120, 300];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level for application logging (e.g., "info", "debug", "warn", "error")
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upstream pRPC endpoints and request deadlines
    #[serde(default)]
    pub rpc: RpcSettings,
    /// Snapshot freshness windows
    #[serde(default)]
    pub cache: CacheSettings,
    /// Watch-mode cadence
    #[serde(default)]
    pub poller: PollerSettings,
    /// Prometheus listener; no exporter is installed when unset
    #[serde(default)]
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Endpoints in try order
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_health_check_timeout_ms")]
    pub health_check_timeout_ms: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            timeout_ms: default_timeout_ms(),
            health_check_timeout_ms: default_health_check_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    #[serde(default = "default_stale_ms")]
    pub stale_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: default_cache_ttl_ms(),
            stale_ms: default_stale_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Settings {
    /// Load from an optional config file, `.env` and `PNODE__*` variables.
    /// Environment variables take priority over the file.
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        // NOTE: a missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::load(path, environment())
    }

    pub fn load<P: AsRef<Path>>(path: Option<P>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(File::from(file.as_ref()));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        validate_config(&settings)?;

        Ok(settings)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            default: Duration::from_millis(self.rpc.timeout_ms),
            health_check: Duration::from_millis(self.rpc.health_check_timeout_ms),
        }
    }

    pub fn cache_windows(&self) -> CacheWindows {
        CacheWindows {
            ttl: Duration::from_millis(self.cache.ttl_ms),
            stale: Duration::from_millis(self.cache.stale_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval_secs)
    }

    pub fn registry(&self) -> Result<EndpointRegistry> {
        let endpoints = self
            .rpc
            .endpoints
            .iter()
            .map(|e| Url::parse(e).with_context(|| format!("Invalid endpoint url '{e}'")))
            .collect::<Result<Vec<_>>>()?;
        Ok(EndpointRegistry::new(
            endpoints,
            self.timeouts(),
            self.cache_windows(),
        )?)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings {{\n\
             \tLog level: {}\n\
             \tEndpoints: {}\n\
             \tTimeout: {}ms (health check {}ms)\n\
             \tCache: ttl {}ms, stale {}ms\n\
             \tPoll interval: {}s\n\
             \tMetrics: {}\n\
             }}",
            self.log_level,
            self.rpc.endpoints.len(),
            self.rpc.timeout_ms,
            self.rpc.health_check_timeout_ms,
            self.cache.ttl_ms,
            self.cache.stale_ms,
            self.poller.interval_secs,
            self.metrics_addr
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| "disabled".to_string()),
        )
    }
}

/// `PNODE__` prefixed variables, e.g. `PNODE__RPC__TIMEOUT_MS=5000`.
/// `PNODE__RPC__ENDPOINTS` takes a comma separated list.
pub fn environment() -> Environment {
    Environment::with_prefix("PNODE")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("rpc.endpoints")
        .try_parsing(true)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoints() -> Vec<String> {
    PNODE_ENDPOINTS.iter().map(|e| e.to_string()).collect()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_health_check_timeout_ms() -> u64 {
    HEALTH_CHECK_TIMEOUT.as_millis() as u64
}

fn default_cache_ttl_ms() -> u64 {
    CACHE_TTL.as_millis() as u64
}

fn default_stale_ms() -> u64 {
    STALE_AFTER.as_millis() as u64
}

fn default_interval_secs() -> u64 {
    30
}
