//! Static description of the upstream pRPC endpoints the client may talk to.

use crate::{Error, Result};
use std::time::Duration;
use url::Url;

/// Public pNodes that expose the pRPC service, in try order.
pub const PNODE_ENDPOINTS: &[&str] = &[
    "http://173.212.203.145:6000/rpc",
    "http://173.212.220.65:6000/rpc",
    "http://161.97.97.41:6000/rpc",
    "http://192.190.136.36:6000/rpc",
    "http://192.190.136.37:6000/rpc",
    "http://192.190.136.38:6000/rpc",
    "http://192.190.136.28:6000/rpc",
    "http://192.190.136.29:6000/rpc",
    "http://207.244.255.1:6000/rpc",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_millis(5_000);
// freshness window of a fetched snapshot
pub const CACHE_TTL: Duration = Duration::from_millis(30_000);
pub const STALE_AFTER: Duration = Duration::from_millis(10_000);

/// Logical pRPC methods understood by pNodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    GetPodsWithStats,
}

impl RpcMethod {
    pub fn wire_name(&self) -> &'static str {
        match self {
            RpcMethod::GetPodsWithStats => "get-pods-with-stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub default: Duration,
    pub health_check: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: DEFAULT_TIMEOUT,
            health_check: HEALTH_CHECK_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheWindows {
    pub ttl: Duration,
    pub stale: Duration,
}

impl Default for CacheWindows {
    fn default() -> Self {
        Self {
            ttl: CACHE_TTL,
            stale: STALE_AFTER,
        }
    }
}

/// Ordered, immutable endpoint list plus the time bounds used against it.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Vec<Url>,
    timeouts: Timeouts,
    cache: CacheWindows,
}

impl EndpointRegistry {
    pub fn new(endpoints: Vec<Url>, timeouts: Timeouts, cache: CacheWindows) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        Ok(Self {
            endpoints,
            timeouts,
            cache,
        })
    }

    pub fn from_strs<S: AsRef<str>>(
        endpoints: &[S],
        timeouts: Timeouts,
        cache: CacheWindows,
    ) -> Result<Self> {
        let endpoints = endpoints
            .iter()
            .map(|e| Url::parse(e.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(endpoints, timeouts, cache)
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn cache_windows(&self) -> CacheWindows {
        self.cache
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        let endpoints = PNODE_ENDPOINTS
            .iter()
            .filter_map(|e| Url::parse(e).ok())
            .collect();
        Self {
            endpoints,
            timeouts: Timeouts::default(),
            cache: CacheWindows::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_keeps_builtin_order() {
        let registry = EndpointRegistry::default();
        assert_eq!(registry.len(), PNODE_ENDPOINTS.len());
        for (url, raw) in registry.endpoints().iter().zip(PNODE_ENDPOINTS) {
            assert_eq!(url.as_str(), *raw);
        }
        assert_eq!(registry.timeouts().default, Duration::from_secs(15));
        assert_eq!(registry.timeouts().health_check, Duration::from_secs(5));
    }

    #[test]
    fn empty_registry_is_rejected() {
        let result = EndpointRegistry::new(vec![], Timeouts::default(), CacheWindows::default());
        assert!(matches!(result, Err(Error::NoEndpoints)));
    }

    #[test]
    fn unparseable_endpoint_is_rejected() {
        let result = EndpointRegistry::from_strs(
            &["not a url"],
            Timeouts::default(),
            CacheWindows::default(),
        );
        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
    }

    #[test]
    fn method_wire_name() {
        assert_eq!(RpcMethod::GetPodsWithStats.wire_name(), "get-pods-with-stats");
    }
}
