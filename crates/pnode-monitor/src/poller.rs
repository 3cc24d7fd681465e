use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use xandeum_prpc_client::{
    CacheWindows, Freshness, HttpTransport, NetworkSnapshot, PrpcClient, Transport, fetch_snapshot,
};

/// Periodically pulls a [`NetworkSnapshot`] and keeps the last good one.
///
/// A failed cycle never replaces the last good snapshot; it is only aged by
/// [`Freshness`] so callers can tell how old the data they show is.
pub struct Poller<T = HttpTransport> {
    client: Arc<PrpcClient<T>>,
    poll_interval: Duration,
    windows: CacheWindows,
    last_good: Option<NetworkSnapshot>,
    next_id: u64,
}

impl<T> Poller<T>
where
    T: Transport + Send + Sync,
{
    pub fn new(client: Arc<PrpcClient<T>>, poll_interval: Duration, windows: CacheWindows) -> Self {
        Self {
            client,
            poll_interval,
            windows,
            last_good: None,
            next_id: 1,
        }
    }

    pub fn last_snapshot(&self) -> Option<&NetworkSnapshot> {
        self.last_good.as_ref()
    }

    pub fn freshness(&self) -> Option<Freshness> {
        self.last_good
            .as_ref()
            .map(|snapshot| Freshness::of(snapshot.fetched_at(), Utc::now(), self.windows))
    }

    /// One fetch cycle. Each cycle uses a new request id.
    pub async fn poll_once(&mut self) -> xandeum_prpc_client::Result<&NetworkSnapshot> {
        let id = self.next_id;
        self.next_id += 1;

        match fetch_snapshot(&self.client, id).await {
            Ok(snapshot) => {
                export_snapshot_metrics(&snapshot);
                Ok(&*self.last_good.insert(snapshot))
            }
            Err(err) => {
                metrics::counter!("pnode_monitor_poll_failed").increment(1);
                if let Some(last_good) = &self.last_good {
                    let age_secs = (Utc::now() - last_good.fetched_at()).num_seconds();
                    warn!(
                        age_secs,
                        freshness = ?self.freshness(),
                        "keeping last good snapshot after failed poll"
                    );
                }
                Err(err)
            }
        }
    }

    pub async fn run<F>(&mut self, shutdown_listener: CancellationToken, mut on_snapshot: F)
    where
        F: FnMut(&NetworkSnapshot),
    {
        let mut poll_timer = interval(self.poll_interval);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_listener.cancelled() => {
                    info!("shutdown signal received");
                    break;
                }
                _ = poll_timer.tick() => {
                    match self.poll_once().await {
                        Ok(snapshot) => on_snapshot(snapshot),
                        Err(err) => {
                            error!(%err, "failed to fetch network snapshot; will retry in next cycle");
                        }
                    }
                }
            }
        }
    }
}

fn export_snapshot_metrics(snapshot: &NetworkSnapshot) {
    let stats = &snapshot.stats;
    metrics::gauge!("pnode_monitor_nodes", "kind" => "total").set(stats.total_nodes as f64);
    metrics::gauge!("pnode_monitor_nodes", "kind" => "active").set(stats.active_nodes as f64);
    metrics::gauge!("pnode_monitor_nodes", "kind" => "public").set(stats.public_nodes as f64);
    metrics::gauge!("pnode_monitor_nodes", "kind" => "private").set(stats.private_nodes as f64);
    metrics::gauge!("pnode_monitor_storage_bytes", "kind" => "committed")
        .set(stats.total_storage_committed as f64);
    metrics::gauge!("pnode_monitor_storage_bytes", "kind" => "used")
        .set(stats.total_storage_used as f64);
    metrics::gauge!("pnode_monitor_average_storage_usage_percent").set(stats.average_storage_usage);
    metrics::gauge!("pnode_monitor_average_uptime_seconds").set(stats.average_uptime);
    for (version, count) in &stats.versions {
        metrics::gauge!("pnode_monitor_version_nodes", "version" => version.clone())
            .set(*count as f64);
    }
    metrics::gauge!("pnode_monitor_last_success_timestamp")
        .set(snapshot.fetched_at().timestamp() as f64);
}
