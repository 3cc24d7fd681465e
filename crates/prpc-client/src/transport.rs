use crate::{
    Error, Result,
    rpc::{JsonRpcRequest, RpcEnvelope},
};
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, header};
use std::{error::Error as StdError, time::Duration};
use tracing::trace;
use url::Url;

/// A single request/response exchange with one endpoint.
///
/// Implementations hold no per-call state and may be used concurrently for
/// different endpoints.
#[automock]
#[async_trait]
pub trait Transport {
    async fn send(
        &self,
        endpoint: &Url,
        payload: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<RpcEnvelope>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pnode-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &Url,
        payload: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<RpcEnvelope> {
        let classify = |err: reqwest::Error| classify_error(endpoint, timeout, err);

        let response = self
            .client
            .post(endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;
        trace!(%endpoint, %status, len = body.len(), "received rpc response");

        let envelope: RpcEnvelope = serde_json::from_slice(&body)
            .map_err(|_| Error::malformed(endpoint.as_str(), &body))?;
        if envelope.result.is_none() && !envelope.is_error() {
            return Err(Error::malformed(endpoint.as_str(), &body));
        }
        Ok(envelope)
    }
}

fn classify_error(endpoint: &Url, timeout: Duration, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            endpoint: endpoint.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        Error::Connection {
            endpoint: endpoint.to_string(),
            message: error_chain(&err),
        }
    }
}

// reqwest's top-level message hides the io cause (refused, reset, dns)
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
