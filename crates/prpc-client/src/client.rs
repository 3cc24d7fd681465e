//! Failover pRPC client.
//!
//! Endpoints are tried one at a time, starting from the last endpoint that
//! answered and wrapping around the registry. A single pass is made; the first
//! endpoint to produce a parseable envelope wins, even if that envelope
//! carries a JSON-RPC error.

use crate::{
    Error, Result,
    registry::{EndpointRegistry, RpcMethod},
    rpc::{JsonRpcRequest, PodsWithStats, RpcEnvelope},
    transport::{HttpTransport, Transport},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct RpcReply {
    pub envelope: RpcEnvelope,
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct PodsReply {
    pub pods: PodsWithStats,
    pub endpoint: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Outcome of a health probe. Failure is a value, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

pub struct PrpcClient<T = HttpTransport> {
    registry: EndpointRegistry,
    transport: T,
    // index of the last endpoint that answered; a plain store is enough,
    // concurrent callers settle on last-write-wins
    cursor: AtomicUsize,
}

impl PrpcClient<HttpTransport> {
    pub fn new(registry: EndpointRegistry) -> Result<Self> {
        Ok(Self::with_transport(registry, HttpTransport::new()?))
    }
}

impl<T> PrpcClient<T>
where
    T: Transport + Send + Sync,
{
    pub fn with_transport(registry: EndpointRegistry, transport: T) -> Self {
        Self {
            registry,
            transport,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn endpoints(&self) -> &[Url] {
        self.registry.endpoints()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn current_endpoint(&self) -> &Url {
        &self.registry.endpoints()[self.cursor() % self.registry.len()]
    }

    pub async fn call(&self, method: &str, params: Option<Value>, id: u64) -> Result<RpcReply> {
        self.call_with_timeout(method, params, id, self.registry.timeouts().default)
            .await
    }

    async fn call_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        id: u64,
        timeout: Duration,
    ) -> Result<RpcReply> {
        let payload = JsonRpcRequest::new(method, params, id);
        let endpoints = self.registry.endpoints();
        let total = endpoints.len();
        let start = self.cursor() % total;
        let mut failures = Vec::with_capacity(total);

        for offset in 0..total {
            let index = (start + offset) % total;
            let endpoint = &endpoints[index];
            debug!(%endpoint, method, attempt = offset + 1, "trying pRPC endpoint");

            let started = Instant::now();
            match self.transport.send(endpoint, &payload, timeout).await {
                Ok(envelope) => {
                    self.cursor.store(index, Ordering::Relaxed);
                    metrics::counter!("pnode_prpc_endpoint_success", "endpoint" => endpoint.to_string())
                        .increment(1);
                    metrics::histogram!("pnode_prpc_request_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    info!(%endpoint, method, "pRPC call answered");
                    return Ok(RpcReply {
                        envelope,
                        endpoint: endpoint.clone(),
                    });
                }
                Err(err) => {
                    warn!(%endpoint, method, error = %err, "pRPC endpoint failed");
                    metrics::counter!("pnode_prpc_endpoint_failure", "endpoint" => endpoint.to_string())
                        .increment(1);
                    failures.push(format!("{endpoint}: {err}"));
                }
            }
        }

        error!(attempts = total, method, "all pRPC endpoints failed");
        Err(Error::AllEndpointsFailed(failures))
    }

    /// Fetch every known pod. A JSON-RPC error body is returned as
    /// [`Error::UpstreamRpc`] without trying the remaining endpoints.
    pub async fn get_pods_with_stats(&self, id: u64) -> Result<PodsReply> {
        let reply = self
            .call(RpcMethod::GetPodsWithStats.wire_name(), None, id)
            .await?;
        Ok(PodsReply {
            pods: reply.envelope.into_result()?,
            endpoint: reply.endpoint,
        })
    }

    /// Issue `get-pods-with-stats` across the endpoints and report whether
    /// any answered. Each attempt uses the shorter health-check timeout, not
    /// the default request timeout.
    pub async fn health_check(&self) -> HealthCheck {
        let timeout = self.registry.timeouts().health_check;
        let outcome = self
            .call_with_timeout(RpcMethod::GetPodsWithStats.wire_name(), None, 1, timeout)
            .await
            .and_then(|reply| {
                let pods: PodsWithStats = reply.envelope.into_result()?;
                Ok((pods, reply.endpoint))
            });

        match outcome {
            Ok((pods, endpoint)) => {
                let node_count = if pods.pods.is_empty() {
                    pods.total_count
                } else {
                    pods.pods.len() as u64
                };
                HealthCheck {
                    status: HealthStatus::Ok,
                    endpoint: Some(endpoint.to_string()),
                    node_count: Some(node_count),
                    message: None,
                }
            }
            Err(err) => HealthCheck {
                status: HealthStatus::Error,
                endpoint: None,
                node_count: None,
                message: Some(err.to_string()),
            },
        }
    }
}
