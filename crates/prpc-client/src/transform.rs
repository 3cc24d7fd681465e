//! Raw pod records into display-ready nodes.

use crate::{
    format::{format_bytes, format_relative_time, format_uptime},
    nullable,
    rpc::RawNodeRecord,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::warn;

/// Seen within this many seconds means the node is live.
pub const ACTIVE_WINDOW_SECS: i64 = 120;
/// Seen within this many seconds but not live means catching up.
pub const SYNCING_WINDOW_SECS: i64 = 600;
/// A live node that restarted more recently than this is still syncing.
pub const MIN_STABLE_UPTIME_SECS: u64 = 300;
pub const DEFAULT_RPC_PORT: u16 = 6000;
pub const UNKNOWN_IP: &str = "unknown";

/// Declaration order is the presentation rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Syncing,
    Offline,
}

impl NodeStatus {
    /// Pure classification from how long ago the node was seen and its uptime.
    pub fn classify(age_secs: i64, uptime: Option<u64>) -> Self {
        if age_secs < ACTIVE_WINDOW_SECS {
            match uptime {
                Some(uptime) if uptime < MIN_STABLE_UPTIME_SECS => NodeStatus::Syncing,
                _ => NodeStatus::Online,
            }
        } else if age_secs < SYNCING_WINDOW_SECS {
            NodeStatus::Syncing
        } else {
            NodeStatus::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Online => "online",
            NodeStatus::Syncing => "syncing",
            NodeStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(NodeStatus::Online),
            "syncing" => Ok(NodeStatus::Syncing),
            "offline" => Ok(NodeStatus::Offline),
            _ => Err(format!(
                "Invalid status: '{s}'. Use 'online', 'syncing' or 'offline'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNode {
    pub id: String,
    pub pubkey: String,
    pub address: String,
    pub ip: String,
    pub port: u16,
    pub version: String,
    pub is_public: bool,
    pub last_seen: i64,
    pub last_seen_formatted: String,
    pub uptime: u64,
    pub uptime_formatted: String,
    pub storage_committed: u64,
    pub storage_committed_formatted: String,
    pub storage_used: u64,
    pub storage_used_formatted: String,
    /// Percentage in `[0, 100]`.
    pub storage_usage_percent: f64,
    pub status: NodeStatus,
    pub rpc_port: u16,
}

/// Split `"ip:port"` on its single colon. Addresses with more than one colon
/// (IPv6 literals) are not parsed.
pub fn parse_address(address: &str) -> (String, u16) {
    let (ip, port) = match address.split_once(':') {
        Some((_, port)) if port.contains(':') => return (UNKNOWN_IP.to_string(), 0),
        Some((ip, port)) => (ip, port.parse().unwrap_or(0)),
        None => (address, 0),
    };
    (nullable::text(Some(ip), UNKNOWN_IP), port)
}

/// Upstream reports usage as a fraction. Anything outside `[0, 1]` is not
/// trusted and the percentage is derived from the byte counts instead.
fn usage_percent(raw: &RawNodeRecord) -> f64 {
    match raw.storage_usage_percent {
        None => 0.0,
        Some(fraction) if fraction.is_finite() && (0.0..=1.0).contains(&fraction) => {
            fraction * 100.0
        }
        Some(fraction) => {
            warn!(
                address = %raw.address,
                value = fraction,
                "storage_usage_percent is not a fraction; deriving from used/committed"
            );
            let committed = nullable::count(raw.storage_committed);
            if committed == 0 {
                0.0
            } else {
                nullable::count(raw.storage_used) as f64 / committed as f64 * 100.0
            }
        }
    }
}

pub fn normalize(raw: &RawNodeRecord, now: i64) -> NormalizedNode {
    let (ip, port) = parse_address(&raw.address);
    let pubkey = raw.pubkey.as_deref();
    let storage_committed = nullable::count(raw.storage_committed);
    let storage_used = nullable::count(raw.storage_used);
    let uptime = nullable::count(raw.uptime);

    NormalizedNode {
        id: nullable::text(pubkey, &raw.address),
        pubkey: nullable::text(pubkey, "Unknown"),
        address: raw.address.clone(),
        ip,
        port,
        version: nullable::text(Some(&raw.version), "unknown"),
        is_public: nullable::flag(raw.is_public),
        last_seen: raw.last_seen_timestamp,
        last_seen_formatted: format_relative_time(raw.last_seen_timestamp, now),
        uptime,
        uptime_formatted: format_uptime(uptime),
        storage_committed,
        storage_committed_formatted: format_bytes(storage_committed),
        storage_used,
        storage_used_formatted: format_bytes(storage_used),
        storage_usage_percent: usage_percent(raw),
        status: NodeStatus::classify(now.saturating_sub(raw.last_seen_timestamp), raw.uptime),
        rpc_port: nullable::port(raw.rpc_port, DEFAULT_RPC_PORT),
    }
}

/// Normalize every record and order by status rank, then committed storage
/// descending. The sort is stable so equal nodes keep upstream order.
pub fn normalize_all(raws: &[RawNodeRecord], now: i64) -> Vec<NormalizedNode> {
    let mut nodes: Vec<_> = raws.iter().map(|raw| normalize(raw, now)).collect();

    let mut seen = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        if !seen.insert(node.id.as_str()) {
            warn!(id = %node.id, address = %node.address, "duplicate node id in pod list");
        }
    }

    nodes.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.storage_committed.cmp(&a.storage_committed))
    });
    nodes
}
