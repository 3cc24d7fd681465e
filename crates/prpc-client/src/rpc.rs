//! JSON-RPC 2.0 wire types spoken by pNodes.

use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// A parsed JSON-RPC response. An `error` body is still a valid envelope;
/// it only becomes an [`Error`] once the caller asks for the result.
///
/// Every field is optional here. The transport rejects an envelope carrying
/// neither `result` nor `error` as malformed, so failover moves past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

impl RpcEnvelope {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::UpstreamRpc {
                code: err.code,
                message: err.message,
                details: err.details.unwrap_or_default(),
            });
        }
        let result = self.result.ok_or(Error::MissingResult)?;
        Ok(serde_json::from_value(result)?)
    }
}

/// One storage-provider process as reported by `get-pods-with-stats`.
///
/// Only `address`, `last_seen_timestamp` and `version` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNodeRecord {
    pub address: String,
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    pub last_seen_timestamp: i64,
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub storage_committed: Option<u64>,
    #[serde(default)]
    pub storage_used: Option<u64>,
    /// Fraction in `[0, 1]`, not a percentage.
    #[serde(default)]
    pub storage_usage_percent: Option<f64>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub rpc_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodsWithStats {
    pub pods: Vec<RawNodeRecord>,
    #[serde(default)]
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_absent_params() {
        let req = JsonRpcRequest::new("get-pods-with-stats", None, 7);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "get-pods-with-stats"})
        );
    }

    #[test]
    fn error_envelope_surfaces_as_upstream_error() {
        let envelope: RpcEnvelope = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "Method not found", "details": ["get-pods"]}
        }))
        .unwrap();
        assert!(envelope.is_error());

        match envelope.into_result::<PodsWithStats>() {
            Err(Error::UpstreamRpc {
                code,
                message,
                details,
            }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
                assert_eq!(details, vec!["get-pods".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn envelope_without_result_or_error() {
        let envelope: RpcEnvelope =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(matches!(
            envelope.into_result::<PodsWithStats>(),
            Err(Error::MissingResult)
        ));
    }

    #[test]
    fn pods_with_nullable_fields_deserialize() {
        let envelope: RpcEnvelope = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "pods": [{
                    "address": "10.0.0.1:9001",
                    "is_public": null,
                    "last_seen_timestamp": 1700000000,
                    "pubkey": null,
                    "rpc_port": null,
                    "storage_committed": null,
                    "storage_usage_percent": null,
                    "storage_used": null,
                    "uptime": null,
                    "version": "0.7.3"
                }],
                "total_count": 1
            }
        }))
        .unwrap();

        let pods: PodsWithStats = envelope.into_result().unwrap();
        assert_eq!(pods.total_count, 1);
        let pod = &pods.pods[0];
        assert_eq!(pod.address, "10.0.0.1:9001");
        assert_eq!(pod.pubkey, None);
        assert_eq!(pod.uptime, None);
        assert_eq!(pod.version, "0.7.3");
    }

    #[test]
    fn result_with_wrong_shape_is_invalid() {
        let envelope: RpcEnvelope = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"pods": "nope"}
        }))
        .unwrap();
        assert!(matches!(
            envelope.into_result::<PodsWithStats>(),
            Err(Error::InvalidResult(_))
        ));
    }
}
