//! # Credential Lifecycle Errors
//!
//! Wraps the pipeline taxonomy ([`TxError`]) and adds the failures only the
//! lifecycle layer can detect: a malformed commitment caught before any I/O,
//! an owner mismatch seen on a readable record, a contract that is not
//! configured for the selected network, and a contract result of the wrong
//! shape.

use thiserror::Error;
use zkid_core::{EncodingError, IdentityError};
use zkid_rpc::ConfigError as RpcConfigError;
use zkid_tx::TxError;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Proof, signals or commitment could not be encoded. Raised before I/O.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Any failure of the invocation pipeline, including named contract errors.
    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The network profile has no id for this contract.
    #[error("no {0} contract id configured for this network")]
    MissingContract(&'static str),

    /// Read-only calls need an existing account to build against.
    #[error("no simulation source account configured for read-only calls")]
    MissingSimulationSource,

    /// The contract returned a value of a shape this client does not expect.
    #[error("{method} returned an unexpected value: {detail}")]
    UnexpectedResult { method: &'static str, detail: String },

    /// Revocation pre-check: the stored owner is not the caller. Reported
    /// under the registry's `Unauthorized` name.
    #[error("unauthorized: credential {credential} is owned by {owner}, not {caller}")]
    NotOwner {
        credential: String,
        owner: String,
        caller: String,
    },

    /// Verification was submitted but not confirmed and the policy forbids issuing.
    #[error("verification transaction {hash} not confirmed; refusing to issue")]
    UnconfirmedVerification { hash: String },
}

impl CredentialError {
    /// The contract's symbolic error name, when the failure is a contract error.
    pub fn contract_error_name(&self) -> Option<&'static str> {
        match self {
            Self::Tx(tx) => tx.contract_error_name(),
            Self::NotOwner { .. } => Some("Unauthorized"),
            _ => None,
        }
    }
}

/// Network profile errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Rpc(#[from] RpcConfigError),

    #[error("unknown network {0:?} (expected testnet or mainnet)")]
    UnknownNetwork(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    #[error("cannot read profile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse profile {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
