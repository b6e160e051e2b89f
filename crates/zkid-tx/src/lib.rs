//! # zkid-tx — Contract Invocation Pipeline
//!
//! Drives a contract call through build, simulate, prepare, sign, submit
//! and confirm, tracking each step in a [`TransactionLifecycle`].
//!
//! ## Architecture
//!
//! The pipeline is parameterized at three seams:
//!
//! - [`LedgerClient`]: account lookup, dry runs, local assembly.
//! - [`PrepareStrategy`]: ordered preparation tiers.
//! - [`TransactionSigner`]: external signing, cancellable.
//!
//! All network access goes through `zkid_rpc::RpcGateway`. Contract-specific
//! knowledge (method names, error-code tables) is supplied by the caller
//! per request; this crate knows no contract.
//!
//! ## Crate Policy
//!
//! - No global configuration. Network and poll policy are explicit.
//! - A confirmation timeout is a warning on the outcome, never an error.

pub mod envelope;
pub mod error;
pub mod humanize;
pub mod ledger;
pub mod orchestrator;
pub mod prepare;
pub mod result;
pub mod signer;
pub mod state;

pub use envelope::{ContractCall, DecoratedSignature, Envelope, TransactionDraft};
pub use error::{SigningError, TxError};
pub use humanize::{diagnose_failure, missing_signers, rehumanize};
pub use ledger::{Account, LedgerClient, RpcLedgerClient, Simulation};
pub use orchestrator::{
    Confirmation, InvocationOutcome, InvocationRequest, OrchestratorConfig, PipelineWarning,
    PollPolicy, TransactionOrchestrator, DEFAULT_BASE_FEE, DEFAULT_TX_TIMEOUT_SECS,
};
pub use prepare::{LocalAssemble, PrepareChain, PrepareStrategy, PrepareTier, Prepared, RpcPrepare};
pub use result::{extract_result, parse_contract_error_code, ContractErrorTable, MethodResult};
pub use signer::{FnSigner, SignedPayload, SigningContext, TransactionSigner};
pub use state::{StateError, TransactionLifecycle, TransactionState, TransitionRecord};

pub use tokio_util::sync::CancellationToken;
