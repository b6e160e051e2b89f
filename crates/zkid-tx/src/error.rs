//! # Pipeline Error Taxonomy
//!
//! Every failure of a contract invocation is classified into exactly one
//! [`TxError`] variant so callers can tell a rejected proof from a flaky
//! endpoint from a declined wallet prompt.
//!
//! A confirmation timeout is *not* an error: it surfaces as
//! `Confirmation::Unconfirmed` on a successful outcome.

use thiserror::Error;
use zkid_core::EncodingError;
use zkid_rpc::RpcError;

use crate::state::StateError;

/// Failure of one stage of the invocation pipeline.
#[derive(Error, Debug)]
pub enum TxError {
    /// Arguments or envelope could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Transport, HTTP or JSON-RPC failure talking to the endpoint.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// The dry run was rejected for a reason other than a contract error code.
    #[error("simulation rejected: {message}")]
    Simulation { message: String },

    /// The contract returned a typed error, during simulation or after confirmation.
    #[error("{contract} contract error #{code} ({name})")]
    Contract {
        contract: &'static str,
        code: u32,
        name: &'static str,
    },

    /// The signer declined, failed, was cancelled, or returned nothing usable.
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// The ledger refused the submission or the transaction failed on-chain.
    #[error("submission failed: {message}")]
    Submission {
        hash: Option<String>,
        message: String,
        /// Raw diagnostic as returned by the endpoint, if any.
        detail: Option<String>,
    },

    /// The local assemble step could not produce a prepared envelope.
    #[error("preparation failed: {0}")]
    Preparation(String),

    /// An envelope could not be decoded.
    #[error("malformed envelope: {0}")]
    Envelope(String),

    /// `getAccount` returned a sequence that is not a number.
    #[error("account {account} has unparseable sequence {sequence:?}")]
    Sequence { account: String, sequence: String },

    #[error(transparent)]
    State(#[from] StateError),
}

impl TxError {
    /// The symbolic contract error name, when this is a contract error.
    pub fn contract_error_name(&self) -> Option<&'static str> {
        match self {
            Self::Contract { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Failure reported by a [`TransactionSigner`](crate::signer::TransactionSigner).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("signature request declined: {0}")]
    Declined(String),

    #[error("signer failed: {0}")]
    Failed(String),

    #[error("signing cancelled")]
    Cancelled,

    #[error("signer returned an empty envelope")]
    Empty,

    #[error("signer response is malformed: {0}")]
    Malformed(String),
}
