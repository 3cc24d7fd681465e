//! Client for the pRPC interface exposed by Xandeum pNodes.
//!
//! [`client::PrpcClient`] walks a fixed [`registry::EndpointRegistry`] with
//! sticky failover, [`transform`] turns the raw pod records into display
//! rows and [`aggregate`] folds them into network statistics.
//! [`snapshot::fetch_snapshot`] ties one full cycle together.

pub mod aggregate;
pub mod client;
mod error;
pub mod format;
mod nullable;
pub mod query;
pub mod registry;
pub mod rpc;
pub mod snapshot;
pub mod transform;
pub mod transport;

pub use aggregate::{NetworkStats, aggregate};
pub use client::{HealthCheck, HealthStatus, PrpcClient, RpcReply};
pub use error::{Error, Result};
pub use registry::{CacheWindows, EndpointRegistry, RpcMethod, Timeouts};
pub use rpc::{RawNodeRecord, RpcEnvelope};
pub use snapshot::{Freshness, NetworkSnapshot, fetch_raw, fetch_snapshot};
pub use transform::{NodeStatus, NormalizedNode, normalize, normalize_all};
pub use transport::{HttpTransport, Transport};
