//! # zkid-credentials — Credential Lifecycle
//!
//! Domain layer over the invocation pipeline: the verifier, credential
//! registry and compliance oracle contracts, addressed through one explicit
//! [`NetworkConfig`].
//!
//! ## Architecture
//!
//! - [`CredentialLifecycleManager`]: verify, issue, revoke and registry reads.
//! - [`ComplianceOracleClient`]: sanctions flags and explanations.
//! - [`contracts`]: method names and per-contract error tables.
//!
//! Both clients share one `TransactionOrchestrator`; neither holds mutable
//! state, so a manager can serve concurrent callers.
//!
//! ## Crate Policy
//!
//! - Inputs are validated before the first network call.
//! - An unconfirmed transaction is reported as unconfirmed, never as success.

pub(crate) mod client;
pub mod compliance;
pub mod config;
pub mod contracts;
pub mod credential;
pub mod error;
pub mod manager;

pub use client::PipelineReceipt;
pub use compliance::ComplianceOracleClient;
pub use config::{
    Network, NetworkConfig, DEFAULT_CREDENTIAL_TTL_SECS, DEFAULT_SETTLE_DELAY, MAINNET_PASSPHRASE,
    MOCK_COMPLIANCE_ID, MOCK_REGISTRY_ID, MOCK_VERIFIER_ID, TESTNET_PASSPHRASE,
};
pub use contracts::{COMPLIANCE_ERRORS, REGISTRY_ERRORS, VERIFIER_ERRORS};
pub use credential::{CredentialRecord, CredentialStatus, Explanation};
pub use error::{ConfigError, CredentialError};
pub use manager::{CredentialLifecycleManager, UnconfirmedPolicy, VerifiedCredential};
