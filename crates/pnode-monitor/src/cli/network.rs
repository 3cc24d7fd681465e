use crate::cli::{OutputFormat, print_table, render};
use anyhow::{Result, bail};
use clap::Subcommand;
use serde::Serialize;
use xandeum_prpc_client::{
    HealthCheck, HealthStatus, NetworkStats, PrpcClient, Transport, fetch_snapshot,
    format::{format_bytes, format_number, format_percentage, format_uptime},
    query::versions_by_count,
};

#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Network-wide statistics and the version histogram
    Stats {
        /// Output format
        #[arg(short = 'f', long, default_value = "table")]
        output_format: OutputFormat,
    },
    #[command(
        about = "Check that at least one pRPC endpoint answers",
        after_help = "Exits with status 1 when every endpoint fails."
    )]
    Health {
        /// Output format
        #[arg(short = 'f', long, default_value = "table")]
        output_format: OutputFormat,
    },
    /// List the configured pRPC endpoints in try order
    Endpoints {
        /// Output format
        #[arg(short = 'f', long, default_value = "table")]
        output_format: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndpointList {
    endpoints: Vec<String>,
    current: String,
    timeout_ms: u64,
    health_check_timeout_ms: u64,
}

pub async fn handle<T>(client: &PrpcClient<T>, cmd: NetworkCommands) -> Result<String>
where
    T: Transport + Send + Sync,
{
    match cmd {
        NetworkCommands::Stats { output_format } => {
            let snapshot = fetch_snapshot(client, 1).await?;
            render(&snapshot.stats, output_format, print_stats)
        }
        NetworkCommands::Health { output_format } => {
            let health = client.health_check().await;
            let rendered = render(&health, output_format, print_health)?;
            if !health.is_ok() {
                println!("{rendered}");
                bail!(
                    "health check failed: {}",
                    health.message.as_deref().unwrap_or("unknown error")
                );
            }
            Ok(rendered)
        }
        NetworkCommands::Endpoints { output_format } => {
            let timeouts = client.registry().timeouts();
            let list = EndpointList {
                endpoints: client.endpoints().iter().map(|e| e.to_string()).collect(),
                current: client.current_endpoint().to_string(),
                timeout_ms: timeouts.default.as_millis() as u64,
                health_check_timeout_ms: timeouts.health_check.as_millis() as u64,
            };
            render(&list, output_format, print_endpoints)
        }
    }
}

pub fn print_stats(stats: &NetworkStats) -> String {
    let summary = vec![
        vec!["total nodes".to_string(), stats.total_nodes.to_string()],
        vec!["active nodes".to_string(), stats.active_nodes.to_string()],
        vec!["public nodes".to_string(), stats.public_nodes.to_string()],
        vec!["private nodes".to_string(), stats.private_nodes.to_string()],
        vec![
            "storage committed".to_string(),
            format_bytes(stats.total_storage_committed),
        ],
        vec![
            "storage used".to_string(),
            format_bytes(stats.total_storage_used),
        ],
        vec![
            "average usage".to_string(),
            format_percentage(stats.average_storage_usage, 2),
        ],
        vec![
            "average uptime".to_string(),
            format_uptime(stats.average_uptime as u64),
        ],
        vec!["last updated".to_string(), stats.last_updated.to_rfc3339()],
    ];

    let versions = versions_by_count(stats)
        .into_iter()
        .map(|(version, count)| {
            let share = if stats.total_nodes == 0 {
                0.0
            } else {
                count as f64 / stats.total_nodes as f64 * 100.0
            };
            vec![
                version.to_string(),
                format_number(count as f64, 0),
                format_percentage(share, 1),
            ]
        })
        .collect();

    format!(
        "{}\n\n{}",
        print_table(&["metric", "value"], summary),
        print_table(&["version", "nodes", "share"], versions),
    )
}

fn print_health(health: &HealthCheck) -> String {
    print_table(
        &["status", "endpoint", "nodes", "message"],
        vec![vec![
            match health.status {
                HealthStatus::Ok => "ok",
                HealthStatus::Error => "error",
            }
            .to_string(),
            health.endpoint.clone().unwrap_or_else(|| "-".to_string()),
            health
                .node_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            health.message.clone().unwrap_or_else(|| "-".to_string()),
        ]],
    )
}

fn print_endpoints(list: &EndpointList) -> String {
    let rows = list
        .endpoints
        .iter()
        .enumerate()
        .map(|(index, endpoint)| {
            vec![
                index.to_string(),
                endpoint.clone(),
                if *endpoint == list.current { "*" } else { "" }.to_string(),
            ]
        })
        .collect();

    format!(
        "{}\ntimeout: {}ms, health check timeout: {}ms",
        print_table(&["#", "endpoint", "current"], rows),
        list.timeout_ms,
        list.health_check_timeout_ms,
    )
}
