use crate::{
    Result,
    aggregate::{NetworkStats, aggregate},
    client::{PrpcClient, RpcReply},
    registry::{CacheWindows, RpcMethod},
    transform::{NormalizedNode, normalize_all},
    transport::Transport,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything one successful fetch cycle produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub pods: Vec<NormalizedNode>,
    pub stats: NetworkStats,
    pub total_count: u64,
    pub endpoint: String,
}

impl NetworkSnapshot {
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.stats.last_updated
    }
}

/// Run one fetch cycle: pull the pod list, normalize it and fold the stats.
pub async fn fetch_snapshot<T>(client: &PrpcClient<T>, id: u64) -> Result<NetworkSnapshot>
where
    T: Transport + Send + Sync,
{
    let reply = client.get_pods_with_stats(id).await?;
    let now = Utc::now();

    let pods = normalize_all(&reply.pods.pods, now.timestamp());
    let stats = aggregate(&reply.pods.pods, now);
    info!(
        endpoint = %reply.endpoint,
        pods = pods.len(),
        active = stats.active_nodes,
        "fetched network snapshot"
    );

    Ok(NetworkSnapshot {
        pods,
        stats,
        total_count: reply.pods.total_count,
        endpoint: reply.endpoint.to_string(),
    })
}

/// The untransformed envelope, tagged with the endpoint that produced it.
pub async fn fetch_raw<T>(client: &PrpcClient<T>, id: u64) -> Result<RpcReply>
where
    T: Transport + Send + Sync,
{
    client
        .call(RpcMethod::GetPodsWithStats.wire_name(), None, id)
        .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
    Expired,
}

impl Freshness {
    pub fn of(fetched_at: DateTime<Utc>, now: DateTime<Utc>, windows: CacheWindows) -> Self {
        let age = (now - fetched_at).to_std().unwrap_or_default();
        if age >= windows.ttl {
            Freshness::Expired
        } else if age >= windows.stale {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        client::tests::{Behavior, registry, scripted},
        transform::NodeStatus,
    };
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    fn client(behaviors: Vec<Behavior>) -> PrpcClient<crate::transport::MockTransport> {
        let n = behaviors.len();
        PrpcClient::with_transport(
            registry(n),
            scripted(Arc::new(Mutex::new(behaviors)), Arc::default()),
        )
    }

    #[tokio::test]
    async fn snapshot_carries_pods_stats_and_endpoint() {
        let client = client(vec![Behavior::Timeout, Behavior::Pods(3)]);

        let snapshot = fetch_snapshot(&client, 1).await.unwrap();
        assert_eq!(snapshot.endpoint, "http://10.0.0.1:6000/rpc");
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.pods.len(), 3);
        assert_eq!(snapshot.stats.total_nodes, 3);
        // fixture nodes were last seen long ago
        assert!(snapshot.pods.iter().all(|p| p.status == NodeStatus::Offline));
        assert_eq!(snapshot.stats.active_nodes, 0);
        // equal status, so committed storage decides
        let committed: Vec<_> = snapshot.pods.iter().map(|p| p.storage_committed).collect();
        assert_eq!(committed, vec![3072, 2048, 1024]);
    }

    #[tokio::test]
    async fn failure_is_surfaced_not_substituted() {
        let client = client(vec![Behavior::Refused, Behavior::Timeout]);
        let err = fetch_snapshot(&client, 1).await.unwrap_err();
        assert!(matches!(err, Error::AllEndpointsFailed(ref f) if f.len() == 2));

        let client = self::client(vec![Behavior::RpcError]);
        let err = fetch_snapshot(&client, 1).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamRpc { .. }));
    }

    #[tokio::test]
    async fn raw_fetch_keeps_the_envelope() {
        let client = client(vec![Behavior::RpcError]);
        let reply = fetch_raw(&client, 1).await.unwrap();
        assert!(reply.envelope.is_error());
        assert_eq!(reply.endpoint.as_str(), "http://10.0.0.0:6000/rpc");
    }

    #[test]
    fn freshness_windows() {
        let windows = CacheWindows::default();
        let fetched = Utc::now();
        assert_eq!(Freshness::of(fetched, fetched, windows), Freshness::Fresh);
        assert_eq!(
            Freshness::of(fetched, fetched + Duration::seconds(9), windows),
            Freshness::Fresh
        );
        assert_eq!(
            Freshness::of(fetched, fetched + Duration::seconds(10), windows),
            Freshness::Stale
        );
        assert_eq!(
            Freshness::of(fetched, fetched + Duration::seconds(30), windows),
            Freshness::Expired
        );
        // a clock that went backwards is not an old snapshot
        assert_eq!(
            Freshness::of(fetched, fetched - Duration::seconds(60), windows),
            Freshness::Fresh
        );
    }
}
