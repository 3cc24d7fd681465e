use crate::cli::{OutputFormat, print_table, render, to_json_string};
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use xandeum_prpc_client::{
    NodeStatus, NormalizedNode, PrpcClient, Transport, fetch_raw, fetch_snapshot,
    format::{format_percentage, format_relative_time, shorten_pubkey},
    query::{
        Direction, NodeFilter, SortField, StatusCounts, Visibility, page_count, paginate,
        sort_nodes, status_counts, top_by_storage, top_by_uptime,
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_TOP_COUNT: usize = 5;

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    #[command(
        about = "Fetch the pNode list once and print it",
        after_help = r#"Examples:
    # Online public nodes, most storage first
    pnode-monitor fetch --status online --visibility public --sort storage

    # Search by pubkey, address or version
    pnode-monitor fetch --search 0.7.3 -f json-pretty

    # The untransformed upstream response
    pnode-monitor fetch --raw"#
    )]
    Fetch {
        /// Case-insensitive match against pubkey, address, ip and version
        #[arg(short, long)]
        search: Option<String>,

        /// Only nodes with this status (online, syncing, offline)
        #[arg(long)]
        status: Option<NodeStatus>,

        /// Only public or private nodes
        #[arg(long)]
        visibility: Option<Visibility>,

        /// Sort by uptime, storage or last-seen (default: status then storage)
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Nodes per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Print the upstream JSON-RPC response without transforming it
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short = 'f', long, default_value = "table")]
        output_format: OutputFormat,
    },
    /// Top nodes by uptime (online only) and by committed storage
    Top {
        /// How many nodes per list
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_COUNT)]
        count: usize,

        /// Output format
        #[arg(short = 'f', long, default_value = "table")]
        output_format: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePage<'a> {
    pub pods: &'a [&'a NormalizedNode],
    pub total_count: u64,
    pub matched: usize,
    pub page: usize,
    pub per_page: usize,
    pub pages: usize,
    pub counts: StatusCounts,
    pub endpoint: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNodes<'a> {
    pub by_uptime: Vec<&'a NormalizedNode>,
    pub by_storage: Vec<&'a NormalizedNode>,
}

#[derive(Debug, Serialize)]
struct RawReply<'a> {
    endpoint: &'a str,
    response: &'a xandeum_prpc_client::RpcEnvelope,
}

pub async fn handle<T>(client: &PrpcClient<T>, cmd: NodeCommands) -> Result<String>
where
    T: Transport + Send + Sync,
{
    match cmd {
        NodeCommands::Fetch {
            search,
            status,
            visibility,
            sort,
            asc,
            limit,
            page,
            raw,
            output_format,
        } => {
            if raw {
                let reply = fetch_raw(client, 1).await?;
                let raw = RawReply {
                    endpoint: reply.endpoint.as_str(),
                    response: &reply.envelope,
                };
                return to_json_string(&raw, output_format != OutputFormat::Json);
            }

            let snapshot = fetch_snapshot(client, 1).await?;
            let filter = NodeFilter {
                search,
                status,
                visibility,
            };
            let mut matched = filter.apply(&snapshot.pods);
            if let Some(field) = sort {
                let direction = if asc { Direction::Asc } else { Direction::Desc };
                sort_nodes(&mut matched, field, direction);
            }

            let page = page.max(1);
            let node_page = NodePage {
                pods: paginate(&matched, page, limit),
                total_count: snapshot.total_count,
                matched: matched.len(),
                page,
                per_page: limit,
                pages: page_count(matched.len(), limit),
                counts: status_counts(&snapshot.pods),
                endpoint: &snapshot.endpoint,
            };
            render(&node_page, output_format, print_node_page)
        }
        NodeCommands::Top {
            count,
            output_format,
        } => {
            let snapshot = fetch_snapshot(client, 1).await?;
            let top = TopNodes {
                by_uptime: top_by_uptime(&snapshot.pods, count),
                by_storage: top_by_storage(&snapshot.pods, count),
            };
            render(&top, output_format, print_top_nodes)
        }
    }
}

pub fn print_nodes(nodes: &[&NormalizedNode]) -> String {
    let now = Utc::now().timestamp();
    let rows = nodes
        .iter()
        .map(|node| {
            vec![
                node.status.to_string(),
                shorten_pubkey(Some(node.pubkey.as_str()), 8),
                node.address.clone(),
                node.version.clone(),
                if node.is_public { "public" } else { "private" }.to_string(),
                node.uptime_formatted.clone(),
                node.storage_committed_formatted.clone(),
                node.storage_used_formatted.clone(),
                format_percentage(node.storage_usage_percent, 2),
                format_relative_time(node.last_seen, now),
            ]
        })
        .collect();

    print_table(
        &[
            "status",
            "pubkey",
            "address",
            "version",
            "visibility",
            "uptime",
            "committed",
            "used",
            "usage",
            "last_seen",
        ],
        rows,
    )
}

fn print_node_page(page: &NodePage<'_>) -> String {
    let shown = if page.pods.is_empty() {
        "0".to_string()
    } else {
        let first = (page.page - 1) * page.per_page + 1;
        format!("{first}-{}", first + page.pods.len() - 1)
    };
    format!(
        "{}\nShowing {} of {} matching nodes (page {}/{}, from {})\nonline: {}, syncing: {}, offline: {}, reported total: {}",
        print_nodes(page.pods),
        shown,
        page.matched,
        page.page,
        page.pages.max(1),
        page.endpoint,
        page.counts.online,
        page.counts.syncing,
        page.counts.offline,
        page.total_count,
    )
}

fn print_top_nodes(top: &TopNodes<'_>) -> String {
    let uptime_rows = top
        .by_uptime
        .iter()
        .enumerate()
        .map(|(rank, node)| {
            vec![
                (rank + 1).to_string(),
                shorten_pubkey(Some(node.pubkey.as_str()), 8),
                node.address.clone(),
                node.uptime_formatted.clone(),
            ]
        })
        .collect();
    let storage_rows = top
        .by_storage
        .iter()
        .enumerate()
        .map(|(rank, node)| {
            vec![
                (rank + 1).to_string(),
                shorten_pubkey(Some(node.pubkey.as_str()), 8),
                node.address.clone(),
                node.storage_committed_formatted.clone(),
                format_percentage(node.storage_usage_percent, 2),
            ]
        })
        .collect();

    format!(
        "Top nodes by uptime\n{}\n\nTop nodes by storage\n{}",
        print_table(&["#", "pubkey", "address", "uptime"], uptime_rows),
        print_table(&["#", "pubkey", "address", "committed", "usage"], storage_rows),
    )
}
