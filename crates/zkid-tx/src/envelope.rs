//! # Transaction Envelopes
//!
//! An [`Envelope`] is the opaque, base64-encoded form of a transaction that
//! travels to the endpoint and to signers. Envelopes built here wrap the
//! canonical JSON of a [`TransactionDraft`]; envelopes returned by an
//! endpoint's prepare call or by an external signer are carried verbatim.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zkid_core::{AccountId, CanonicalBytes, ContractId, ScValue};
use zkid_rpc::Footprint;

use crate::error::TxError;

/// A single contract method invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: ContractId,
    pub method: String,
    pub args: Vec<ScValue>,
}

impl ContractCall {
    pub fn new(contract: ContractId, method: impl Into<String>, args: Vec<ScValue>) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
        }
    }
}

/// A signature attached by a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    pub signer: String,
    pub signature: String,
}

/// Unsigned transaction contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub source: AccountId,
    pub sequence: u64,
    pub fee: u64,
    pub network_passphrase: String,
    pub timeout_secs: u64,
    pub invocation: ContractCall,
    #[serde(default)]
    pub footprint: Option<Footprint>,
    #[serde(default)]
    pub resource_fee: Option<u64>,
    #[serde(default)]
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionDraft {
    /// True once footprint and resource fee have been attached.
    pub fn is_assembled(&self) -> bool {
        self.footprint.is_some() && self.resource_fee.is_some()
    }
}

/// Opaque base64 transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(String);

impl Envelope {
    /// Encode a draft canonically, so equal drafts give equal envelopes.
    pub fn encode(draft: &TransactionDraft) -> Result<Self, TxError> {
        let canonical = CanonicalBytes::new(draft).map_err(zkid_core::EncodingError::from)?;
        Ok(Self(STANDARD.encode(canonical.as_bytes())))
    }

    /// Wrap an envelope produced elsewhere.
    pub fn from_base64(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Decode back into a draft. Fails for envelopes not built by [`Envelope::encode`].
    pub fn decode(&self) -> Result<TransactionDraft, TxError> {
        let bytes = STANDARD
            .decode(self.0.as_bytes())
            .map_err(|e| TxError::Envelope(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| TxError::Envelope(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
