use crate::{
    cli::{OutputFormat, to_json_string},
    poller::Poller,
    settings::ALLOWED_POLL_INTERVALS,
};
use anyhow::{Result, bail};
use clap::Args;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use xandeum_prpc_client::{
    CacheWindows, NetworkSnapshot, PrpcClient, Transport,
    format::{format_bytes, format_percentage},
};

/// Poll the network until interrupted
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between polls (30, 60, 120 or 300); defaults to poller.interval_secs
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Output format for each snapshot summary
    #[arg(short = 'f', long, default_value = "table")]
    pub output_format: OutputFormat,
}

impl WatchArgs {
    pub fn poll_interval(&self, configured: Duration) -> Result<Duration> {
        match self.interval {
            Some(secs) if !ALLOWED_POLL_INTERVALS.contains(&secs) => bail!(
                "--interval must be one of {:?}, got {secs}",
                ALLOWED_POLL_INTERVALS
            ),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(configured),
        }
    }
}

pub async fn run<T>(
    client: Arc<PrpcClient<T>>,
    args: WatchArgs,
    configured: Duration,
    windows: CacheWindows,
    shutdown_listener: CancellationToken,
) -> Result<()>
where
    T: Transport + Send + Sync,
{
    let poll_interval = args.poll_interval(configured)?;
    info!(
        endpoints = client.endpoints().len(),
        poll_interval_secs = poll_interval.as_secs(),
        "pNode monitor starting in WATCH mode"
    );

    let mut poller = Poller::new(client, poll_interval, windows);
    let format = args.output_format;
    poller
        .run(shutdown_listener, |snapshot| {
            match summarize(snapshot, format) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(?err, "failed to render snapshot"),
            }
        })
        .await;

    info!("pNode monitor shutting down");

    Ok(())
}

/// One line per snapshot for tables, the full stats object for JSON.
pub fn summarize(snapshot: &NetworkSnapshot, format: OutputFormat) -> Result<String> {
    let stats = &snapshot.stats;
    match format {
        OutputFormat::Table => Ok(format!(
            "[{}] nodes: {} (active {}, public {}, private {}) storage: {} / {} ({}) via {}",
            stats.last_updated.format("%Y-%m-%d %H:%M:%S"),
            stats.total_nodes,
            stats.active_nodes,
            stats.public_nodes,
            stats.private_nodes,
            format_bytes(stats.total_storage_used),
            format_bytes(stats.total_storage_committed),
            format_percentage(stats.average_storage_usage, 2),
            snapshot.endpoint,
        )),
        OutputFormat::Json => to_json_string(stats, false),
        OutputFormat::JsonPretty => to_json_string(stats, true),
    }
}
