use super::{ALLOWED_POLL_INTERVALS, Settings};
use anyhow::{Result, bail};
use url::Url;

/// Validate the configuration values
pub fn validate_config(settings: &Settings) -> Result<()> {
    if settings.rpc.endpoints.is_empty() {
        bail!("At least one pRPC endpoint must be configured");
    }

    for endpoint in &settings.rpc.endpoints {
        let url = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(err) => bail!("Invalid pRPC endpoint '{endpoint}': {err}"),
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("pRPC endpoint '{endpoint}' must start with http:// or https://");
        }
    }

    if settings.rpc.timeout_ms == 0 {
        bail!("RPC timeout_ms must be greater than 0");
    }

    if settings.rpc.health_check_timeout_ms == 0 {
        bail!("RPC health_check_timeout_ms must be greater than 0");
    }

    if settings.cache.ttl_ms == 0 {
        bail!("Cache ttl_ms must be greater than 0");
    }

    if settings.cache.stale_ms > settings.cache.ttl_ms {
        bail!(
            "Cache stale_ms ({}) must not exceed ttl_ms ({})",
            settings.cache.stale_ms,
            settings.cache.ttl_ms
        );
    }

    if !ALLOWED_POLL_INTERVALS.contains(&settings.poller.interval_secs) {
        bail!(
            "Poller interval_secs must be one of {:?}, got {}",
            ALLOWED_POLL_INTERVALS,
            settings.poller.interval_secs
        );
    }

    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&settings.log_level.to_lowercase().as_str()) {
        bail!(
            "Invalid log level '{}'. Valid options are: {:?}",
            settings.log_level,
            valid_log_levels
        );
    }

    Ok(())
}
