use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use pnode_monitor::{
    cli::{self, network::NetworkCommands, nodes::NodeCommands, watch::WatchArgs},
    settings::Settings,
};
use std::{path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use xandeum_prpc_client::PrpcClient;

#[derive(Parser, Debug)]
#[command(
    name = "pnode-monitor",
    about = "Monitor the Xandeum pNode network through its pRPC relays",
    version,
    author,
    after_help = r#"Configuration:
    Configuration can be provided via:
    1. Environment variables with PNODE__ prefix (e.g., PNODE__RPC__TIMEOUT_MS)
    2. .env file in the current directory
    3. Config file with -c option (TOML)

Examples:
    # Online nodes as a table
    pnode-monitor fetch --status online

    # Network statistics as JSON
    pnode-monitor stats -f json-pretty

    # Poll every minute until interrupted
    pnode-monitor watch --interval 60"#
)]
pub struct Cli {
    /// Path to the configuration file (TOML format)
    ///
    /// If not provided, will attempt to load from environment variables
    #[clap(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Nodes(NodeCommands),
    #[command(flatten)]
    Network(NetworkCommands),
    /// Poll the network until SIGINT/SIGTERM
    Watch(WatchArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::new(self.config.as_ref())?;
        init_logging(&settings.log_level)?;
        debug!("{settings}");

        if let Some(metrics_addr) = settings.metrics_addr {
            PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
                .context("Failed to install Prometheus exporter")?;
            info!(%metrics_addr, "prometheus exporter listening");
        }
        export_build_info();

        let client = PrpcClient::new(settings.registry()?)?;

        // Route to module handlers
        let output = match self.command {
            Commands::Nodes(cmd) => cli::nodes::handle(&client, cmd).await?,
            Commands::Network(cmd) => cli::network::handle(&client, cmd).await?,
            Commands::Watch(args) => {
                return cli::watch::run(
                    Arc::new(client),
                    args,
                    settings.poll_interval(),
                    settings.cache_windows(),
                    shutdown_listener()?,
                )
                .await;
            }
        };
        println!("{output}");

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}

fn init_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

fn shutdown_listener() -> Result<CancellationToken> {
    let cancellation_token = CancellationToken::new();
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("sigterm listener failed")?;
    tokio::spawn({
        let cancellation_token = cancellation_token.clone();
        async move {
            tokio::select! {
                _ = sigterm.recv() => cancellation_token.cancel(),
                _ = signal::ctrl_c() => cancellation_token.cancel(),
            }
        }
    });

    Ok(cancellation_token)
}

fn export_build_info() {
    let version = option_env!("BUILD_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    let build_commit = option_env!("BUILD_COMMIT").unwrap_or("UNKNOWN");
    let build_date = option_env!("DATE").unwrap_or("UNKNOWN");
    let pkg_version = env!("CARGO_PKG_VERSION");

    metrics::gauge!(
        "pnode_monitor_build_info",
        "version" => version,
        "commit" => build_commit,
        "date" => build_date,
        "pkg_version" => pkg_version
    )
    .set(1);
}
