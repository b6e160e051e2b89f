//! # zkid-rpc — Typed JSON-RPC Gateway
//!
//! Thin, typed access to the ledger RPC endpoint:
//! - `sendTransaction` / `getTransaction` for submission and polling
//! - `simulateTransaction` / `prepareTransaction` for fee and footprint discovery
//! - `getAccount` for sequence numbers, `getHealth` for liveness
//!
//! ## Architecture
//!
//! Every call is a JSON-RPC 2.0 POST with a fresh request id. The gateway
//! never interprets ledger semantics: a non-2xx HTTP status, a populated
//! `error` member, or a malformed body each map to a distinct [`RpcError`]
//! variant, and callers decide what they mean. Transport failures are
//! retried per [`RetryPolicy`], and submissions only while the request
//! cannot have reached the endpoint; nothing else is.

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::{ConfigError, RpcConfig};
pub use error::{RpcError, METHOD_NOT_FOUND};
pub use retry::RetryPolicy;
pub use types::{
    AccountResponse, Footprint, GetTransactionResponse, HealthResponse,
    PrepareTransactionResponse, SendStatus, SendTransactionResponse, SimulateTransactionResponse,
    TransactionStatus,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use types::{JsonRpcRequest, JsonRpcResponse};

/// JSON-RPC client for one ledger endpoint.
#[derive(Debug, Clone)]
pub struct RpcGateway {
    http: reqwest::Client,
    url: Url,
    retry: RetryPolicy,
}

impl RpcGateway {
    /// Create a gateway from configuration.
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.auth_token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|_| RpcError::Config(ConfigError::InvalidToken))?,
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RpcError::Http {
                method: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            url: config.url.clone(),
            retry: config.retry,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one JSON-RPC call and deserialize its `result`.
    ///
    /// A missing `result` is deserialized from `null`, so `R = Option<_>`
    /// or `()` accept empty results.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        };
        tracing::debug!(method, id = %request.id, "sending JSON-RPC request");

        let resp = retry::retry_send(&self.retry, method, || {
            self.http.post(self.url.clone()).json(&request).send()
        })
        .await
        .map_err(|e| RpcError::Http {
            method: method.to_string(),
            source: e,
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| RpcError::Http {
            method: method.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let envelope: JsonRpcResponse =
            serde_json::from_str(&body).map_err(|e| RpcError::Deserialization {
                method: method.to_string(),
                source: e,
            })?;

        if let Some(err) = envelope.error {
            return Err(RpcError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null)).map_err(|e| {
            RpcError::Deserialization {
                method: method.to_string(),
                source: e,
            }
        })
    }

    /// Submit a signed envelope.
    pub async fn send_transaction(&self, envelope: &str) -> Result<SendTransactionResponse, RpcError> {
        self.call("sendTransaction", json!({ "transaction": envelope }))
            .await
    }

    /// Query the status of a submitted transaction.
    pub async fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, RpcError> {
        self.call("getTransaction", json!({ "hash": hash })).await
    }

    /// Dry-run an envelope.
    pub async fn simulate_transaction(
        &self,
        envelope: &str,
    ) -> Result<SimulateTransactionResponse, RpcError> {
        self.call("simulateTransaction", json!({ "transaction": envelope }))
            .await
    }

    /// Ask the endpoint to prepare an envelope.
    ///
    /// Returns `Ok(None)` when the endpoint does not implement the method.
    pub async fn prepare_transaction(&self, envelope: &str) -> Result<Option<String>, RpcError> {
        let result: Result<Option<PrepareTransactionResponse>, RpcError> = self
            .call("prepareTransaction", json!({ "transaction": envelope }))
            .await;
        match result {
            Ok(prepared) => Ok(prepared.map(|p| p.transaction)),
            Err(e) if e.is_method_not_found() => {
                tracing::debug!("endpoint does not implement prepareTransaction");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Look up an account's current sequence number.
    pub async fn get_account(&self, account: &str) -> Result<AccountResponse, RpcError> {
        self.call("getAccount", json!({ "address": account })).await
    }

    /// Endpoint liveness.
    pub async fn get_health(&self) -> Result<HealthResponse, RpcError> {
        self.call("getHealth", json!({})).await
    }
}
