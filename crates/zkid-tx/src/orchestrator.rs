//! # Transaction Orchestrator
//!
//! Runs one contract invocation end to end:
//!
//! ```text
//! build ──▶ simulate ──▶ prepare (tiered) ──▶ sign ──▶ submit ──▶ poll
//! ```
//!
//! ## Outcome Semantics
//!
//! - A contract `Err(code)` during simulation aborts before signing.
//! - Preparation never aborts; exhausting every tier is recorded as
//!   [`PipelineWarning::PrepareDegraded`] and the built envelope is signed.
//! - An `ERROR` submission aborts with a rehumanized message.
//! - Polling stops at `SUCCESS` (confirmed value) or `FAILED` (error).
//!   If the budget runs out the outcome is [`Confirmation::Unconfirmed`],
//!   carries the simulated value, and records
//!   [`PipelineWarning::ConfirmationTimeout`]. An unconfirmed outcome is
//!   never reported as confirmed.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use zkid_core::AccountId;
use zkid_rpc::{RpcGateway, SendStatus, TransactionStatus};

use crate::envelope::{ContractCall, Envelope, TransactionDraft};
use crate::error::{SigningError, TxError};
use crate::humanize::{decode_diagnostic_text, diagnose_failure, rehumanize};
use crate::ledger::{LedgerClient, RpcLedgerClient, Simulation};
use crate::prepare::{PrepareChain, PrepareTier};
use crate::result::{extract_result, parse_contract_error_code, ContractErrorTable, MethodResult};
use crate::signer::{SigningContext, TransactionSigner};
use crate::state::{TransactionLifecycle, TransactionState, TransitionRecord};

/// Base fee in stroops before resource fees.
pub const DEFAULT_BASE_FEE: u64 = 100;

/// Transaction validity window.
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 180;

// ─── Configuration ───────────────────────────────────────────────────

/// How long to wait for a submitted transaction to reach a final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    #[serde(with = "millis")]
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub network_passphrase: String,
    pub base_fee: u64,
    pub tx_timeout_secs: u64,
    pub poll: PollPolicy,
}

impl OrchestratorConfig {
    pub fn new(network_passphrase: impl Into<String>) -> Self {
        Self {
            network_passphrase: network_passphrase.into(),
            base_fee: DEFAULT_BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            poll: PollPolicy::default(),
        }
    }
}

// ─── Requests and outcomes ───────────────────────────────────────────

/// One state-changing invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub call: ContractCall,
    /// Transaction source; also the account asked to sign.
    pub source: AccountId,
    pub errors: ContractErrorTable,
    pub cancel: Option<CancellationToken>,
}

impl InvocationRequest {
    pub fn new(call: ContractCall, source: AccountId, errors: ContractErrorTable) -> Self {
        Self {
            call,
            source,
            errors,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Whether the ledger confirmed the transaction before polling gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    /// Submitted but not confirmed in time; the value is the simulated one.
    Unconfirmed,
}

/// Non-fatal conditions observed while running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    PrepareDegraded { attempted: Vec<PrepareTier> },
    ConfirmationTimeout { hash: String, attempts: u32 },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrepareDegraded { attempted } => {
                let tiers: Vec<String> = attempted.iter().map(ToString::to_string).collect();
                write!(f, "all preparation tiers failed ({}); signed the unprepared envelope", tiers.join(", "))
            }
            Self::ConfirmationTimeout { hash, attempts } => write!(
                f,
                "transaction {hash} not confirmed after {attempts} polls; using simulated result"
            ),
        }
    }
}

/// Everything known about a finished invocation.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub value: MethodResult,
    pub confirmation: Confirmation,
    pub hash: Option<String>,
    pub built_envelope: Envelope,
    pub prepared_envelope: Envelope,
    pub submitted_envelope: Envelope,
    pub prepared_by: PrepareTier,
    pub warnings: Vec<PipelineWarning>,
    pub transitions: Vec<TransitionRecord>,
}

impl InvocationOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.confirmation == Confirmation::Confirmed
    }
}

// ─── Orchestrator ────────────────────────────────────────────────────

pub struct TransactionOrchestrator {
    gateway: RpcGateway,
    ledger: Arc<dyn LedgerClient>,
    prepare: PrepareChain,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for TransactionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionOrchestrator")
            .field("gateway", &self.gateway.url().as_str())
            .field("prepare", &self.prepare)
            .field("config", &self.config)
            .finish()
    }
}

impl TransactionOrchestrator {
    pub fn new(
        gateway: RpcGateway,
        ledger: Arc<dyn LedgerClient>,
        prepare: PrepareChain,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            ledger,
            prepare,
            config,
        }
    }

    /// Standard wiring: RPC-backed ledger client and the default tier order.
    pub fn over_rpc(gateway: RpcGateway, config: OrchestratorConfig) -> Self {
        let ledger: Arc<dyn LedgerClient> = Arc::new(RpcLedgerClient::new(gateway.clone()));
        let prepare = PrepareChain::standard(gateway.clone(), ledger.clone());
        Self::new(gateway, ledger, prepare, config)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn gateway(&self) -> &RpcGateway {
        &self.gateway
    }

    /// Read-only call: build and simulate, never sign or submit.
    pub async fn simulate_only(
        &self,
        call: ContractCall,
        source: &AccountId,
        errors: &ContractErrorTable,
    ) -> Result<MethodResult, TxError> {
        let span = tracing::debug_span!("simulate", contract = %call.contract, method = %call.method);
        async move {
            let envelope = self.build(call, source).await?;
            let simulation = self.simulate(&envelope, errors).await?;
            extract_result(simulation.return_value, errors)
        }
        .instrument(span)
        .await
    }

    /// Run the full pipeline for a state-changing call.
    pub async fn invoke(
        &self,
        request: InvocationRequest,
        signer: &dyn TransactionSigner,
    ) -> Result<InvocationOutcome, TxError> {
        self.invoke_traced(request, signer).await.0
    }

    /// [`invoke`](Self::invoke), also returning the state history. On
    /// failure the history ends in [`TransactionState::Failed`] with the
    /// error as its reason.
    pub async fn invoke_traced(
        &self,
        request: InvocationRequest,
        signer: &dyn TransactionSigner,
    ) -> (Result<InvocationOutcome, TxError>, TransactionLifecycle) {
        let span = tracing::info_span!(
            "invoke",
            contract = %request.call.contract,
            method = %request.call.method,
        );
        let mut lifecycle = TransactionLifecycle::new();
        let result = self
            .run(request, signer, &mut lifecycle)
            .instrument(span)
            .await;
        if let Err(e) = &result {
            lifecycle.fail(&e.to_string());
            for t in &lifecycle.transitions {
                tracing::debug!(from = %t.from_state, to = %t.to_state, reason = %t.reason, "transition");
            }
            tracing::debug!(state = %lifecycle.state, error = %e, "invocation aborted");
        }
        (result, lifecycle)
    }

    async fn run(
        &self,
        request: InvocationRequest,
        signer: &dyn TransactionSigner,
        lifecycle: &mut TransactionLifecycle,
    ) -> Result<InvocationOutcome, TxError> {
        let InvocationRequest {
            call,
            source,
            errors,
            cancel,
        } = request;
        let mut warnings = Vec::new();

        // Build
        let built = self.build(call, &source).await?;

        // Simulate
        let simulation = self.simulate(&built, &errors).await?;
        let simulated_value = extract_result(simulation.return_value.clone(), &errors)?;
        lifecycle.advance(TransactionState::Simulated, "simulation succeeded")?;

        // Prepare
        let prepared = self.prepare.prepare(&built, &simulation).await;
        if prepared.is_degraded() {
            tracing::warn!(attempted = ?prepared.attempted, "all preparation tiers failed, signing unprepared envelope");
            warnings.push(PipelineWarning::PrepareDegraded {
                attempted: prepared.attempted.clone(),
            });
        }
        lifecycle.advance(TransactionState::Prepared, &format!("prepared by {}", prepared.tier))?;

        // Sign
        let ctx = SigningContext {
            network_passphrase: self.config.network_passphrase.clone(),
            address: source.clone(),
        };
        let payload = match &cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(SigningError::Cancelled),
                signed = signer.sign(&prepared.envelope, &ctx) => signed,
            },
            None => signer.sign(&prepared.envelope, &ctx).await,
        }?;
        let signed = payload.into_envelope()?;
        lifecycle.advance(TransactionState::Signed, "signer returned envelope")?;

        // Submit
        let hash = self.submit(&signed).await?;
        lifecycle.advance(TransactionState::Submitted, &format!("accepted as {hash}"))?;
        tracing::info!(%hash, "transaction submitted");

        // Confirm
        let (value, confirmation) = match self.poll(&hash, &errors).await? {
            Some(confirmed) => {
                lifecycle.advance(TransactionState::Confirmed, "ledger reported SUCCESS")?;
                (confirmed.unwrap_or(simulated_value), Confirmation::Confirmed)
            }
            None => {
                let attempts = self.config.poll.max_attempts;
                tracing::warn!(%hash, attempts, "confirmation timed out, using simulated result");
                lifecycle.advance(TransactionState::TimedOut, "poll budget exhausted")?;
                warnings.push(PipelineWarning::ConfirmationTimeout {
                    hash: hash.clone(),
                    attempts,
                });
                (simulated_value, Confirmation::Unconfirmed)
            }
        };

        Ok(InvocationOutcome {
            value,
            confirmation,
            hash: Some(hash),
            built_envelope: built,
            prepared_envelope: prepared.envelope,
            submitted_envelope: signed,
            prepared_by: prepared.tier,
            warnings,
            transitions: lifecycle.transitions.clone(),
        })
    }

    async fn build(&self, call: ContractCall, source: &AccountId) -> Result<Envelope, TxError> {
        let account = self.ledger.load_account(source).await?;
        let draft = TransactionDraft {
            source: source.clone(),
            sequence: account.sequence.saturating_add(1),
            fee: self.config.base_fee,
            network_passphrase: self.config.network_passphrase.clone(),
            timeout_secs: self.config.tx_timeout_secs,
            invocation: call,
            footprint: None,
            resource_fee: None,
            signatures: Vec::new(),
        };
        Envelope::encode(&draft)
    }

    async fn simulate(&self, envelope: &Envelope, errors: &ContractErrorTable) -> Result<Simulation, TxError> {
        match self.ledger.simulate(envelope).await {
            Ok(sim) => Ok(sim),
            Err(TxError::Simulation { message }) => {
                if let Some(code) = parse_contract_error_code(&message) {
                    return Err(errors.error(code));
                }
                Err(TxError::Simulation {
                    message: rehumanize(&message),
                })
            }
            Err(other) => Err(other),
        }
    }

    async fn submit(&self, signed: &Envelope) -> Result<String, TxError> {
        let resp = self.gateway.send_transaction(signed.as_str()).await?;
        match (&resp.status, resp.hash.clone()) {
            (SendStatus::Pending | SendStatus::Duplicate, Some(hash)) if !hash.is_empty() => Ok(hash),
            (SendStatus::Error, hash) => {
                let detail = resp.error_detail();
                let message = detail
                    .as_deref()
                    .map(|d| rehumanize(&decode_diagnostic_text(d)))
                    .unwrap_or_else(|| "ledger rejected the transaction".to_string());
                Err(TxError::Submission {
                    hash,
                    message,
                    detail,
                })
            }
            (SendStatus::TryAgainLater, hash) => Err(TxError::Submission {
                hash,
                message: "ledger asked to try again later".into(),
                detail: None,
            }),
            (status, hash) => Err(TxError::Submission {
                hash,
                message: format!("unexpected submission status {}", String::from(status.clone())),
                detail: None,
            }),
        }
    }

    /// `Ok(Some(value))` on SUCCESS, `Ok(None)` when the budget runs out.
    ///
    /// The inner `Option` is `None` if the confirmed result carried no return value.
    async fn poll(
        &self,
        hash: &str,
        errors: &ContractErrorTable,
    ) -> Result<Option<Option<MethodResult>>, TxError> {
        let PollPolicy {
            interval,
            max_attempts,
        } = self.config.poll;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(interval).await;
            let resp = match self.gateway.get_transaction(hash).await {
                Ok(resp) => resp,
                Err(e) if e.is_transport() => {
                    tracing::warn!(attempt, error = %e, "getTransaction failed, will retry");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match resp.status {
                TransactionStatus::Success => {
                    let value = match resp.return_value {
                        Some(v) => Some(extract_result(Some(v), errors)?),
                        None => None,
                    };
                    return Ok(Some(value));
                }
                TransactionStatus::Failed => {
                    let meta = resp.result_meta_xdr.as_deref();
                    let result = resp.result_xdr.as_deref();
                    let decoded = [meta, result]
                        .into_iter()
                        .flatten()
                        .map(decode_diagnostic_text)
                        .collect::<Vec<_>>()
                        .join("\n");
                    if let Some(code) = parse_contract_error_code(&decoded) {
                        return Err(errors.error(code));
                    }
                    return Err(TxError::Submission {
                        hash: Some(hash.to_string()),
                        message: diagnose_failure(meta, result),
                        detail: meta.or(result).map(str::to_string),
                    });
                }
                _ => tracing::debug!(attempt, max_attempts, "transaction not yet final"),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_policy_serializes_millis() {
        let policy = PollPolicy {
            interval: Duration::from_millis(250),
            max_attempts: 4,
        };
        let json = serde_json::to_value(policy).unwrap();
        assert_eq!(json, serde_json::json!({"interval": 250, "max_attempts": 4}));
        let back: PollPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn default_poll_budget_is_thirty_seconds() {
        let p = PollPolicy::default();
        assert_eq!(p.interval * p.max_attempts, Duration::from_secs(30));
    }

    #[test]
    fn warnings_render_readably() {
        let w = PipelineWarning::ConfirmationTimeout {
            hash: "abc".into(),
            attempts: 30,
        };
        assert!(w.to_string().contains("abc"));
        let d = PipelineWarning::PrepareDegraded {
            attempted: vec![PrepareTier::RpcPrepare, PrepareTier::LocalAssemble],
        };
        assert!(d.to_string().contains("rpc_prepare, local_assemble"));
    }
}
