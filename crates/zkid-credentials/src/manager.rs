//! # Credential Lifecycle Manager
//!
//! Verify a proof, issue a credential from the resulting commitment, revoke
//! it, and read it back.
//!
//! ```text
//! proof + signals ──verify──▶ Commitment ──issue──▶ CredentialId
//!                                                      │
//!                                    revoke ◀──────────┤
//!                             is_valid / get_credential┘
//! ```
//!
//! ## Ordering
//!
//! `issue` depends on the verify transaction having landed. The manager
//! waits a fixed settling delay before issuing; that narrows the window but
//! is not a barrier. [`UnconfirmedPolicy`] decides what `verify_and_issue`
//! does when the verify step was never confirmed.
//!
//! ## Fail-fast validation
//!
//! Proof encoding and commitment parsing happen before any network call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zkid_core::{
    encode_proof, encode_signals, AccountId, Commitment, CredentialId, FieldCodec, FieldInput,
    ProofArtifact, ScValue, VerificationKey,
};
use zkid_rpc::RpcGateway;
use zkid_tx::{
    CancellationToken, ContractCall, MethodResult, TransactionOrchestrator, TransactionSigner, TxError,
};

use crate::client::{
    expect_bool, expect_bytes, expect_optional_address, expect_symbol, expect_void, ContractClient,
    PipelineReceipt,
};
use crate::compliance::ComplianceOracleClient;
use crate::config::NetworkConfig;
use crate::contracts::{registry, verifier, REGISTRY_ERRORS, VERIFIER_ERRORS};
use crate::credential::CredentialRecord;
use crate::error::CredentialError;

/// What `verify_and_issue` does when verification was not confirmed in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconfirmedPolicy {
    /// Issue anyway using the simulated commitment; the receipt still says unconfirmed.
    #[default]
    Proceed,
    /// Stop with [`CredentialError::UnconfirmedVerification`].
    Refuse,
}

/// Result of the combined verify-then-issue flow.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCredential {
    pub commitment: Commitment,
    pub credential_id: CredentialId,
    pub verify: PipelineReceipt<Commitment>,
    pub issue: PipelineReceipt<CredentialId>,
}

impl VerifiedCredential {
    /// Both transactions confirmed on the ledger.
    pub fn is_confirmed(&self) -> bool {
        self.verify.is_confirmed() && self.issue.is_confirmed()
    }
}

#[derive(Debug, Clone)]
pub struct CredentialLifecycleManager {
    config: NetworkConfig,
    client: ContractClient,
    codec: FieldCodec,
}

impl CredentialLifecycleManager {
    /// Wire a manager against the profile's RPC endpoint.
    pub fn new(config: NetworkConfig) -> Result<Self, CredentialError> {
        let gateway = RpcGateway::new(&config.rpc).map_err(TxError::from)?;
        let orchestrator = TransactionOrchestrator::over_rpc(gateway, config.orchestrator_config());
        Ok(Self::with_orchestrator(config, Arc::new(orchestrator)))
    }

    /// Use a pre-built orchestrator (custom ledger client or tier order).
    pub fn with_orchestrator(config: NetworkConfig, orchestrator: Arc<TransactionOrchestrator>) -> Self {
        let codec = config.codec();
        Self {
            config,
            client: ContractClient::new(orchestrator),
            codec,
        }
    }

    /// Cancelling `token` aborts any signing prompt this manager is waiting on.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.client.set_cancellation(token);
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Compliance oracle client sharing this manager's pipeline.
    pub fn compliance(&self) -> ComplianceOracleClient {
        ComplianceOracleClient::from_parts(self.config.clone(), self.client.clone())
    }

    // ─── Verifier ────────────────────────────────────────────────────

    /// Submit a proof to the verifier on behalf of `caller`.
    ///
    /// The caller is an explicit contract argument, so the returned
    /// commitment is bound to that identity by the verifier itself.
    ///
    /// # Errors
    ///
    /// Encoding errors before any I/O; `NotVerified`, `EmptyProof`,
    /// `EmptyInputs`, `InvalidProofSize` or `VkNotSet` as named contract errors.
    pub async fn verify(
        &self,
        caller: &AccountId,
        proof: &ProofArtifact,
        signals: &[FieldInput],
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<Commitment>, CredentialError> {
        let proof = encode_proof(proof, &self.codec)?;
        let inputs = encode_signals(signals, &self.codec)?;
        let verifier_id = self.config.verifier()?.clone();
        tracing::debug!(
            proof_len = proof.len(),
            signals = inputs.signal_count(),
            "encoded verification inputs"
        );

        let call = ContractCall::new(
            verifier_id,
            verifier::VERIFY_IDENTITY_PROOF,
            vec![
                ScValue::address(caller),
                ScValue::bytes(proof.into_bytes()),
                ScValue::bytes(inputs.into_bytes()),
            ],
        );
        let mut outcome = self.client.invoke(call, caller, VERIFIER_ERRORS, signer).await?;
        let raw = expect_bytes(
            verifier::VERIFY_IDENTITY_PROOF,
            std::mem::replace(&mut outcome.value, MethodResult::Void),
        )?;
        let commitment = Commitment::from_slice(&raw)?;
        tracing::info!(%commitment, confirmed = outcome.is_confirmed(), "proof verified");
        Ok(PipelineReceipt::new(commitment, outcome))
    }

    /// Whether the verifier has recorded `commitment`.
    pub async fn is_commit_verified(&self, commitment: &Commitment) -> Result<bool, CredentialError> {
        let call = ContractCall::new(
            self.config.verifier()?.clone(),
            verifier::IS_COMMIT_VERIFIED,
            vec![ScValue::commitment(commitment)],
        );
        let result = self.read(call, VERIFIER_ERRORS).await?;
        expect_bool(verifier::IS_COMMIT_VERIFIED, result)
    }

    /// The identity a commitment was bound to at verification time.
    pub async fn get_commit_owner(&self, commitment: &Commitment) -> Result<Option<String>, CredentialError> {
        let call = ContractCall::new(
            self.config.verifier()?.clone(),
            verifier::GET_COMMIT_OWNER,
            vec![ScValue::commitment(commitment)],
        );
        let result = self.read(call, VERIFIER_ERRORS).await?;
        expect_optional_address(verifier::GET_COMMIT_OWNER, result)
    }

    /// Install the key the verifier checks proofs against.
    ///
    /// The key is encoded with this manager's field policy before any
    /// network call. The verifier replaces any key already set.
    pub async fn set_verification_key(
        &self,
        admin: &AccountId,
        vk: &VerificationKey,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let value = vk.to_sc_value(&self.codec)?;
        let call = ContractCall::new(
            self.config.verifier()?.clone(),
            verifier::SET_VERIFICATION_KEY,
            vec![value],
        );
        let outcome = self.client.invoke(call, admin, VERIFIER_ERRORS, signer).await?;
        expect_void(verifier::SET_VERIFICATION_KEY, &outcome.value)?;
        tracing::info!(
            public_inputs = vk.public_inputs(),
            confirmed = outcome.is_confirmed(),
            "verification key set"
        );
        Ok(PipelineReceipt::new((), outcome))
    }

    /// The stored verification key, or `None` before one is set.
    pub async fn get_verification_key(&self) -> Result<Option<ScValue>, CredentialError> {
        let call = ContractCall::new(
            self.config.verifier()?.clone(),
            verifier::GET_VERIFICATION_KEY,
            vec![],
        );
        match self.read(call, VERIFIER_ERRORS).await? {
            MethodResult::Void => Ok(None),
            MethodResult::Value(value) => Ok(Some(value)),
        }
    }

    pub async fn verifier_version(&self) -> Result<String, CredentialError> {
        let call = ContractCall::new(self.config.verifier()?.clone(), verifier::VERSION, vec![]);
        expect_symbol(verifier::VERSION, self.read(call, VERIFIER_ERRORS).await?)
    }

    // ─── Registry ────────────────────────────────────────────────────

    /// Issue a credential from a hex commitment.
    ///
    /// The commitment must decode to exactly 32 bytes; anything else fails
    /// with an encoding error before any network call.
    pub async fn issue(
        &self,
        owner: &AccountId,
        commitment: &str,
        ttl_secs: u32,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<CredentialId>, CredentialError> {
        let commitment = Commitment::from_hex(commitment)?;
        self.issue_commitment(owner, &commitment, ttl_secs, signer).await
    }

    /// Issue a credential from an already-parsed commitment.
    ///
    /// The credential id is read back from the registry's result. When the
    /// result is unavailable the commitment itself is used, which is the
    /// key the registry stores credentials under.
    pub async fn issue_commitment(
        &self,
        owner: &AccountId,
        commitment: &Commitment,
        ttl_secs: u32,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<CredentialId>, CredentialError> {
        let registry_id = self.config.registry()?.clone();

        let settle = self.config.settle_delay;
        if !settle.is_zero() {
            tracing::debug!(delay_ms = settle.as_millis() as u64, "waiting for verification to settle");
            tokio::time::sleep(settle).await;
        }

        let call = ContractCall::new(
            registry_id,
            registry::ISSUE_CREDENTIAL,
            vec![
                ScValue::address(owner),
                ScValue::commitment(commitment),
                ScValue::U32(ttl_secs),
            ],
        );
        let mut outcome = self.client.invoke(call, owner, REGISTRY_ERRORS, signer).await?;
        let credential_id = match std::mem::replace(&mut outcome.value, MethodResult::Void) {
            MethodResult::Value(ScValue::Bytes(raw)) if !raw.is_empty() => CredentialId::from_bytes(raw),
            MethodResult::Void => {
                tracing::warn!(%commitment, "issue returned no credential id, using the commitment");
                CredentialId::from(*commitment)
            }
            other => {
                return Err(CredentialError::UnexpectedResult {
                    method: registry::ISSUE_CREDENTIAL,
                    detail: format!("{other:?}"),
                })
            }
        };
        tracing::info!(
            credential = %credential_id.short(),
            confirmed = outcome.is_confirmed(),
            "credential issued"
        );
        Ok(PipelineReceipt::new(credential_id, outcome))
    }

    /// Verify a proof and issue a credential from its commitment.
    pub async fn verify_and_issue(
        &self,
        caller: &AccountId,
        proof: &ProofArtifact,
        signals: &[FieldInput],
        ttl_secs: Option<u32>,
        policy: UnconfirmedPolicy,
        signer: &dyn TransactionSigner,
    ) -> Result<VerifiedCredential, CredentialError> {
        let verify = self.verify(caller, proof, signals, signer).await?;
        if !verify.is_confirmed() {
            match policy {
                UnconfirmedPolicy::Refuse => {
                    return Err(CredentialError::UnconfirmedVerification {
                        hash: verify.hash.clone().unwrap_or_default(),
                    })
                }
                UnconfirmedPolicy::Proceed => tracing::warn!(
                    commitment = %verify.value,
                    "verification unconfirmed, issuing from simulated commitment"
                ),
            }
        }

        let commitment = verify.value;
        let ttl = ttl_secs.unwrap_or(self.config.default_ttl_secs);
        let issue = self.issue_commitment(caller, &commitment, ttl, signer).await?;
        Ok(VerifiedCredential {
            commitment,
            credential_id: issue.value.clone(),
            verify,
            issue,
        })
    }

    /// Revoke a credential owned by `owner`.
    ///
    /// When the record can be read first, a foreign owner is rejected
    /// locally; the registry enforces the same rule regardless.
    pub async fn revoke(
        &self,
        owner: &AccountId,
        credential_id: &CredentialId,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let registry_id = self.config.registry()?.clone();

        match self.read_credential(credential_id, owner).await {
            Ok(Some(record)) if record.owner != owner.as_str() => {
                return Err(CredentialError::NotOwner {
                    credential: credential_id.to_string(),
                    owner: record.owner,
                    caller: owner.to_string(),
                })
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "owner pre-check skipped"),
        }

        let call = ContractCall::new(
            registry_id,
            registry::REVOKE,
            vec![ScValue::address(owner), ScValue::bytes(credential_id.as_bytes())],
        );
        let outcome = self.client.invoke(call, owner, REGISTRY_ERRORS, signer).await?;
        expect_void(registry::REVOKE, &outcome.value)?;
        tracing::info!(credential = %credential_id.short(), "credential revoked");
        Ok(PipelineReceipt::new((), outcome))
    }

    /// Registry-side validity: not revoked and not expired at ledger time.
    pub async fn is_valid(&self, credential_id: &CredentialId) -> Result<bool, CredentialError> {
        let call = ContractCall::new(
            self.config.registry()?.clone(),
            registry::IS_VALID,
            vec![ScValue::bytes(credential_id.as_bytes())],
        );
        let result = self.read(call, REGISTRY_ERRORS).await?;
        expect_bool(registry::IS_VALID, result)
    }

    /// The stored record, or `None` if the registry has no such credential.
    pub async fn get_credential(
        &self,
        credential_id: &CredentialId,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let source = self.config.simulation_source()?.clone();
        self.read_credential(credential_id, &source).await
    }

    pub async fn registry_version(&self) -> Result<String, CredentialError> {
        let call = ContractCall::new(self.config.registry()?.clone(), registry::VERSION, vec![]);
        expect_symbol(registry::VERSION, self.read(call, REGISTRY_ERRORS).await?)
    }

    async fn read_credential(
        &self,
        credential_id: &CredentialId,
        source: &AccountId,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let call = ContractCall::new(
            self.config.registry()?.clone(),
            registry::GET_CREDENTIAL,
            vec![ScValue::bytes(credential_id.as_bytes())],
        );
        match self.client.read(call, source, REGISTRY_ERRORS).await? {
            MethodResult::Void => Ok(None),
            MethodResult::Value(value) => {
                CredentialRecord::from_value(credential_id.clone(), &value).map(Some)
            }
        }
    }

    async fn read(
        &self,
        call: ContractCall,
        errors: zkid_tx::ContractErrorTable,
    ) -> Result<MethodResult, CredentialError> {
        let source = self.config.simulation_source()?;
        self.client.read(call, source, errors).await
    }
}
