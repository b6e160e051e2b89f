//! JSON-RPC gateway error types.

use serde_json::Value;

/// JSON-RPC code for an unknown method.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Errors from RPC calls.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP transport error.
    #[error("HTTP error calling {method}: {source}")]
    Http {
        method: String,
        source: reqwest::Error,
    },
    /// Endpoint returned a non-2xx status.
    #[error("RPC endpoint returned HTTP {status} for {method}: {body}")]
    HttpStatus {
        method: String,
        status: u16,
        body: String,
    },
    /// Response body was not a JSON-RPC envelope, or the result had an unexpected shape.
    #[error("failed to deserialize {method} response: {source}")]
    Deserialization {
        method: String,
        source: serde_json::Error,
    },
    /// The JSON-RPC `error` member was populated.
    #[error("RPC {method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
        data: Option<Value>,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl RpcError {
    /// True for transport-level failures (connection refused, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// True when the endpoint does not implement the method.
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == METHOD_NOT_FOUND)
            || matches!(self, Self::HttpStatus { status: 404 | 405 | 501, .. })
    }
}
