use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

/// Raw bodies are cut to this many characters before they land in an error.
pub const MALFORMED_BODY_PREVIEW: usize = 100;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request timeout after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
    #[error("connection error: {message}")]
    Connection { endpoint: String, message: String },
    #[error("invalid JSON response: {body}")]
    MalformedResponse { endpoint: String, body: String },
    #[error("all endpoints failed: {}", .0.join(", "))]
    AllEndpointsFailed(Vec<String>),
    #[error("upstream rpc error {code}: {message}")]
    UpstreamRpc {
        code: i64,
        message: String,
        details: Vec<String>,
    },
    #[error("rpc response carried neither result nor error")]
    MissingResult,
    #[error("rpc result has unexpected shape: {0}")]
    InvalidResult(#[from] serde_json::Error),
    #[error("endpoint registry is empty")]
    NoEndpoints,
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl Error {
    /// Per-endpoint failures that the failover client absorbs and moves past.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Connection { .. } | Error::MalformedResponse { .. }
        )
    }

    pub(crate) fn malformed(endpoint: &str, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body)
            .chars()
            .take(MALFORMED_BODY_PREVIEW)
            .collect();
        Error::MalformedResponse {
            endpoint: endpoint.to_string(),
            body,
        }
    }
}
