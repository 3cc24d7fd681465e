//! Filtering, ranking and paging over normalized nodes.

use crate::{
    aggregate::NetworkStats,
    transform::{NodeStatus, NormalizedNode},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!(
                "Invalid visibility: '{s}'. Use 'public' or 'private'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    Uptime,
    Storage,
    LastSeen,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uptime" => Ok(SortField::Uptime),
            "storage" => Ok(SortField::Storage),
            "last-seen" | "lastseen" => Ok(SortField::LastSeen),
            _ => Err(format!(
                "Invalid sort field: '{s}'. Use 'uptime', 'storage' or 'last-seen'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub search: Option<String>,
    pub status: Option<NodeStatus>,
    pub visibility: Option<Visibility>,
}

impl NodeFilter {
    pub fn matches(&self, node: &NormalizedNode) -> bool {
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let hit = [&node.pubkey, &node.address, &node.version, &node.ip]
                .iter()
                .any(|field| field.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }
        if self.status.is_some_and(|status| node.status != status) {
            return false;
        }
        match self.visibility {
            Some(Visibility::Public) => node.is_public,
            Some(Visibility::Private) => !node.is_public,
            None => true,
        }
    }

    pub fn apply<'a>(&self, nodes: &'a [NormalizedNode]) -> Vec<&'a NormalizedNode> {
        nodes.iter().filter(|node| self.matches(node)).collect()
    }
}

pub fn sort_nodes(nodes: &mut [&NormalizedNode], field: SortField, direction: Direction) {
    let compare = |a: &NormalizedNode, b: &NormalizedNode| -> Ordering {
        match field {
            SortField::Uptime => a.uptime.cmp(&b.uptime),
            SortField::Storage => a.storage_committed.cmp(&b.storage_committed),
            SortField::LastSeen => a.last_seen.cmp(&b.last_seen),
        }
    };
    nodes.sort_by(|a, b| match direction {
        Direction::Asc => compare(a, b),
        Direction::Desc => compare(b, a),
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub online: usize,
    pub syncing: usize,
    pub offline: usize,
}

pub fn status_counts(nodes: &[NormalizedNode]) -> StatusCounts {
    nodes.iter().fold(
        StatusCounts {
            all: nodes.len(),
            ..Default::default()
        },
        |mut counts, node| {
            match node.status {
                NodeStatus::Online => counts.online += 1,
                NodeStatus::Syncing => counts.syncing += 1,
                NodeStatus::Offline => counts.offline += 1,
            }
            counts
        },
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityCounts {
    pub all: usize,
    pub public: usize,
    pub private: usize,
}

pub fn visibility_counts(nodes: &[NormalizedNode]) -> VisibilityCounts {
    let public = nodes.iter().filter(|n| n.is_public).count();
    VisibilityCounts {
        all: nodes.len(),
        public,
        private: nodes.len() - public,
    }
}

/// Longest-running online nodes.
pub fn top_by_uptime(nodes: &[NormalizedNode], n: usize) -> Vec<&NormalizedNode> {
    let mut online: Vec<_> = nodes
        .iter()
        .filter(|node| node.status == NodeStatus::Online)
        .collect();
    online.sort_by(|a, b| b.uptime.cmp(&a.uptime));
    online.truncate(n);
    online
}

/// Nodes with the most committed storage, ignoring those committing nothing.
pub fn top_by_storage(nodes: &[NormalizedNode], n: usize) -> Vec<&NormalizedNode> {
    let mut committed: Vec<_> = nodes.iter().filter(|node| node.storage_committed > 0).collect();
    committed.sort_by(|a, b| b.storage_committed.cmp(&a.storage_committed));
    committed.truncate(n);
    committed
}

/// Version histogram, most common first.
pub fn versions_by_count(stats: &NetworkStats) -> Vec<(&str, u64)> {
    let mut versions: Vec<_> = stats
        .versions
        .iter()
        .map(|(version, count)| (version.as_str(), *count))
        .collect();
    versions.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    versions
}

/// 1-based page of `items`. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 {
        return &[];
    }
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}
