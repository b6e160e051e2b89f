//! Wire types for the ledger JSON-RPC methods.
//!
//! Field names follow the endpoint's camelCase. Unknown status strings are
//! preserved in an `Other` variant rather than failing deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkid_core::ScValue;

// -- JSON-RPC envelope --------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

// -- Status enums -------------------------------------------------------------

/// Status returned by `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SendStatus {
    Pending,
    Duplicate,
    TryAgainLater,
    Error,
    Other(String),
}

impl From<String> for SendStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => Self::Pending,
            "DUPLICATE" => Self::Duplicate,
            "TRY_AGAIN_LATER" => Self::TryAgainLater,
            "ERROR" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<SendStatus> for String {
    fn from(s: SendStatus) -> Self {
        match s {
            SendStatus::Pending => "PENDING".into(),
            SendStatus::Duplicate => "DUPLICATE".into(),
            SendStatus::TryAgainLater => "TRY_AGAIN_LATER".into(),
            SendStatus::Error => "ERROR".into(),
            SendStatus::Other(s) => s,
        }
    }
}

/// Status returned by `getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Success,
    Failed,
    NotFound,
    Other(String),
}

impl From<String> for TransactionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SUCCESS" => Self::Success,
            "FAILED" => Self::Failed,
            "NOT_FOUND" => Self::NotFound,
            _ => Self::Other(s),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(s: TransactionStatus) -> Self {
        match s {
            TransactionStatus::Success => "SUCCESS".into(),
            TransactionStatus::Failed => "FAILED".into(),
            TransactionStatus::NotFound => "NOT_FOUND".into(),
            TransactionStatus::Other(s) => s,
        }
    }
}

// -- Method results -----------------------------------------------------------

/// Result of `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub status: SendStatus,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub error_result: Option<Value>,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
    #[serde(default)]
    pub diagnostic_events_xdr: Option<Vec<String>>,
    #[serde(default)]
    pub latest_ledger: Option<u64>,
}

impl SendTransactionResponse {
    /// Best available textual diagnostic for a rejected submission.
    pub fn error_detail(&self) -> Option<String> {
        if let Some(result) = &self.error_result {
            let text = match result {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !text.is_empty() {
                return Some(text);
            }
        }
        if let Some(xdr) = self.error_result_xdr.as_ref().filter(|s| !s.is_empty()) {
            return Some(xdr.clone());
        }
        self.diagnostic_events_xdr
            .as_ref()
            .filter(|events| !events.is_empty())
            .map(|events| events.join("; "))
    }
}

/// Result of `getTransaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: TransactionStatus,
    #[serde(default)]
    pub return_value: Option<ScValue>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default)]
    pub latest_ledger: Option<u64>,
}

/// Ledger keys a transaction reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footprint {
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub read_write: Vec<String>,
}

/// Result of `simulateTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionResponse {
    #[serde(default)]
    pub retval: Option<ScValue>,
    #[serde(default)]
    pub footprint: Option<Footprint>,
    #[serde(default)]
    pub min_resource_fee: Option<u64>,
    /// Populated when the host rejected the invocation.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub latest_ledger: Option<u64>,
}

/// Result of `prepareTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareTransactionResponse {
    pub transaction: String,
}

/// Result of `getAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    /// Sequence numbers exceed JSON's safe integer range and arrive as strings.
    pub sequence: String,
}

/// Result of `getHealth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u64>,
    #[serde(default)]
    pub oldest_ledger: Option<u64>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_is_preserved() {
        let r: SendTransactionResponse =
            serde_json::from_value(json!({"status": "WEIRD", "hash": "ab"})).unwrap();
        assert_eq!(r.status, SendStatus::Other("WEIRD".into()));
        assert_eq!(serde_json::to_value(&r.status).unwrap(), json!("WEIRD"));
    }

    #[test]
    fn error_detail_prefers_structured_result() {
        let r: SendTransactionResponse = serde_json::from_value(json!({
            "status": "ERROR",
            "errorResult": "txBAD_AUTH",
            "errorResultXdr": "AAAA"
        }))
        .unwrap();
        assert_eq!(r.error_detail().as_deref(), Some("txBAD_AUTH"));

        let xdr_only: SendTransactionResponse =
            serde_json::from_value(json!({"status": "ERROR", "errorResultXdr": "AAAA"})).unwrap();
        assert_eq!(xdr_only.error_detail().as_deref(), Some("AAAA"));
    }

    #[test]
    fn get_transaction_parses_return_value() {
        let r: GetTransactionResponse = serde_json::from_value(json!({
            "status": "SUCCESS",
            "returnValue": {"type": "bool", "value": true}
        }))
        .unwrap();
        assert_eq!(r.status, TransactionStatus::Success);
        assert_eq!(r.return_value, Some(ScValue::Bool(true)));
    }
}
