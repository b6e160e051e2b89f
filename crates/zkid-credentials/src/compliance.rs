//! Compliance oracle client.
//!
//! The oracle keeps a sanctions flag and an optional explanation per proof
//! hash. Writes are admin-only and go through the signing pipeline; reads
//! are simulate-only.

use std::sync::Arc;

use zkid_core::{AccountId, Commitment, ScValue};
use zkid_rpc::RpcGateway;
use zkid_tx::{CancellationToken, ContractCall, MethodResult, TransactionOrchestrator, TransactionSigner, TxError};

use crate::client::{expect_bool, expect_optional_address, expect_symbol, expect_void, ContractClient, PipelineReceipt};
use crate::config::NetworkConfig;
use crate::contracts::{compliance, COMPLIANCE_ERRORS};
use crate::credential::Explanation;
use crate::error::CredentialError;

#[derive(Debug, Clone)]
pub struct ComplianceOracleClient {
    config: NetworkConfig,
    client: ContractClient,
}

impl ComplianceOracleClient {
    pub fn new(config: NetworkConfig) -> Result<Self, CredentialError> {
        let gateway = RpcGateway::new(&config.rpc).map_err(TxError::from)?;
        let orchestrator = TransactionOrchestrator::over_rpc(gateway, config.orchestrator_config());
        Ok(Self::with_orchestrator(config, Arc::new(orchestrator)))
    }

    pub fn with_orchestrator(config: NetworkConfig, orchestrator: Arc<TransactionOrchestrator>) -> Self {
        Self::from_parts(config, ContractClient::new(orchestrator))
    }

    pub(crate) fn from_parts(config: NetworkConfig, client: ContractClient) -> Self {
        Self { config, client }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.client.set_cancellation(token);
        self
    }

    /// Claim the admin role. Fails with `AdminAlreadySet` once claimed.
    pub async fn init(
        &self,
        admin: &AccountId,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let call = ContractCall::new(
            self.config.compliance()?.clone(),
            compliance::INIT,
            vec![ScValue::address(admin)],
        );
        self.write(call, admin, compliance::INIT, signer).await
    }

    pub async fn get_admin(&self) -> Result<Option<String>, CredentialError> {
        let call = ContractCall::new(self.config.compliance()?.clone(), compliance::GET_ADMIN, vec![]);
        expect_optional_address(compliance::GET_ADMIN, self.read(call).await?)
    }

    /// `true` if the proof hash is flagged. Unknown hashes are not flagged.
    pub async fn check_sanctions(&self, proof_hash: &Commitment) -> Result<bool, CredentialError> {
        let call = ContractCall::new(
            self.config.compliance()?.clone(),
            compliance::CHECK_SANCTIONS_LIST,
            vec![ScValue::commitment(proof_hash)],
        );
        expect_bool(compliance::CHECK_SANCTIONS_LIST, self.read(call).await?)
    }

    pub async fn set_sanction_status(
        &self,
        admin: &AccountId,
        proof_hash: &Commitment,
        sanctioned: bool,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let call = ContractCall::new(
            self.config.compliance()?.clone(),
            compliance::SET_SANCTION_STATUS,
            vec![
                ScValue::address(admin),
                ScValue::commitment(proof_hash),
                ScValue::Bool(sanctioned),
            ],
        );
        self.write(call, admin, compliance::SET_SANCTION_STATUS, signer).await
    }

    /// Attach an explanation document hash (and optional URI) to a proof hash.
    pub async fn set_explanation(
        &self,
        admin: &AccountId,
        proof_hash: &Commitment,
        explanation_hash: &[u8],
        uri: Option<&str>,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let uri = uri.map_or(ScValue::Void, |u| ScValue::bytes(u.as_bytes()));
        let call = ContractCall::new(
            self.config.compliance()?.clone(),
            compliance::SET_EXPLANATION,
            vec![
                ScValue::address(admin),
                ScValue::commitment(proof_hash),
                ScValue::bytes(explanation_hash),
                uri,
            ],
        );
        self.write(call, admin, compliance::SET_EXPLANATION, signer).await
    }

    pub async fn get_explanation(&self, proof_hash: &Commitment) -> Result<Option<Explanation>, CredentialError> {
        let call = ContractCall::new(
            self.config.compliance()?.clone(),
            compliance::GET_EXPLANATION,
            vec![ScValue::commitment(proof_hash)],
        );
        match self.read(call).await? {
            MethodResult::Void => Ok(None),
            MethodResult::Value(v) => Explanation::from_value(&v).map(Some),
        }
    }

    pub async fn version(&self) -> Result<String, CredentialError> {
        let call = ContractCall::new(self.config.compliance()?.clone(), compliance::VERSION, vec![]);
        expect_symbol(compliance::VERSION, self.read(call).await?)
    }

    async fn write(
        &self,
        call: ContractCall,
        admin: &AccountId,
        method: &'static str,
        signer: &dyn TransactionSigner,
    ) -> Result<PipelineReceipt<()>, CredentialError> {
        let outcome = self.client.invoke(call, admin, COMPLIANCE_ERRORS, signer).await?;
        expect_void(method, &outcome.value)?;
        tracing::info!(method, confirmed = outcome.is_confirmed(), "compliance update submitted");
        Ok(PipelineReceipt::new((), outcome))
    }

    async fn read(&self, call: ContractCall) -> Result<MethodResult, CredentialError> {
        let source = self.config.simulation_source()?;
        self.client.read(call, source, COMPLIANCE_ERRORS).await
    }
}
