use crate::{nullable, rpc::RawNodeRecord, transform::ACTIVE_WINDOW_SECS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Network-wide totals over one pod list. Never merged across fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_nodes: u64,
    pub active_nodes: u64,
    pub public_nodes: u64,
    pub private_nodes: u64,
    pub total_storage_committed: u64,
    pub total_storage_used: u64,
    pub average_storage_usage: f64,
    pub average_uptime: f64,
    pub versions: BTreeMap<String, u64>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

/// Fold every record into a single [`NetworkStats`] in one pass. `now` is
/// both the liveness reference and the `last_updated` stamp.
pub fn aggregate(raws: &[RawNodeRecord], now: DateTime<Utc>) -> NetworkStats {
    let now_secs = now.timestamp();
    let mut stats = NetworkStats {
        total_nodes: raws.len() as u64,
        active_nodes: 0,
        public_nodes: 0,
        private_nodes: 0,
        total_storage_committed: 0,
        total_storage_used: 0,
        average_storage_usage: 0.0,
        average_uptime: 0.0,
        versions: BTreeMap::new(),
        last_updated: now,
    };
    let mut total_uptime = 0u64;

    for pod in raws {
        stats.total_storage_committed = stats
            .total_storage_committed
            .saturating_add(nullable::count(pod.storage_committed));
        stats.total_storage_used = stats
            .total_storage_used
            .saturating_add(nullable::count(pod.storage_used));
        total_uptime = total_uptime.saturating_add(nullable::count(pod.uptime));

        if now_secs.saturating_sub(pod.last_seen_timestamp) < ACTIVE_WINDOW_SECS {
            stats.active_nodes += 1;
        }
        if nullable::flag(pod.is_public) {
            stats.public_nodes += 1;
        } else {
            stats.private_nodes += 1;
        }

        let version = nullable::text(Some(&pod.version), "unknown");
        *stats.versions.entry(version).or_default() += 1;
    }

    if stats.total_storage_committed > 0 {
        stats.average_storage_usage =
            stats.total_storage_used as f64 / stats.total_storage_committed as f64 * 100.0;
    }
    if stats.total_nodes > 0 {
        stats.average_uptime = total_uptime as f64 / stats.total_nodes as f64;
    }

    stats
}
