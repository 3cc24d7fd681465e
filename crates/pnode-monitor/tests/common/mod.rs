#![allow(dead_code)]

use chrono::Utc;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};
use std::time::Duration;
use xandeum_prpc_client::{CacheWindows, EndpointRegistry, PrpcClient, Timeouts};

/// Three online nodes, one syncing and one long gone.
pub fn fleet() -> Vec<Value> {
    let now = Utc::now().timestamp();
    vec![
        pod("10.0.0.1:9001", "AaaaPubkeyOne111", true, now - 5, 86_400, 4_000, 1_000, "0.7.3"),
        pod("10.0.0.2:9001", "BbbbPubkeyTwo222", false, now - 30, 7_200, 8_000, 2_000, "0.7.3"),
        pod("10.0.0.3:9001", "CcccPubkeyThree3", true, now - 60, 600, 0, 0, "0.8.0"),
        pod("10.0.0.4:9001", "DdddPubkeyFour44", true, now - 300, 900, 2_000, 500, "0.8.0"),
        pod("10.0.0.5:9001", "EeeePubkeyFive55", false, now - 86_400, 50, 1_000, 0, "0.6.1"),
    ]
}

#[allow(clippy::too_many_arguments)]
pub fn pod(
    address: &str,
    pubkey: &str,
    is_public: bool,
    last_seen: i64,
    uptime: u64,
    committed: u64,
    used: u64,
    version: &str,
) -> Value {
    json!({
        "address": address,
        "pubkey": pubkey,
        "is_public": is_public,
        "last_seen_timestamp": last_seen,
        "uptime": uptime,
        "storage_committed": committed,
        "storage_used": used,
        "storage_usage_percent": if committed == 0 { 0.0 } else { used as f64 / committed as f64 },
        "version": version,
        "rpc_port": 6000
    })
}

pub fn pods_body(pods: Vec<Value>) -> String {
    let count = pods.len();
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {"pods": pods, "total_count": count}
    })
    .to_string()
}

pub async fn serve_pods(server: &mut ServerGuard, pods: Vec<Value>) -> Mock {
    server
        .mock("POST", "/rpc")
        .match_body(Matcher::PartialJson(
            json!({"jsonrpc": "2.0", "method": "get-pods-with-stats"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pods_body(pods))
        .create_async()
        .await
}

pub async fn serve_html(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/rpc")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Bad Gateway</body></html>")
        .create_async()
        .await
}

pub fn rpc_url(server: &ServerGuard) -> String {
    format!("{}/rpc", server.url())
}

pub fn client(endpoints: &[String]) -> PrpcClient {
    let timeouts = Timeouts {
        default: Duration::from_secs(2),
        health_check: Duration::from_secs(1),
    };
    let registry = EndpointRegistry::from_strs(endpoints, timeouts, CacheWindows::default()).unwrap();
    PrpcClient::new(registry).unwrap()
}
