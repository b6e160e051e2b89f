//! Shared contract-call plumbing for the lifecycle manager and the
//! compliance client, plus typed views over contract return values.

use std::sync::Arc;

use serde::Serialize;
use zkid_core::{AccountId, ScValue};
use zkid_tx::{
    CancellationToken, Confirmation, ContractCall, ContractErrorTable, InvocationOutcome, InvocationRequest,
    MethodResult, PipelineWarning, PrepareTier, TransactionOrchestrator, TransactionSigner,
    TransitionRecord,
};

use crate::error::CredentialError;

/// What a state-changing call produced, alongside how it got there.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReceipt<T> {
    pub value: T,
    pub confirmation: Confirmation,
    pub hash: Option<String>,
    pub prepared_by: PrepareTier,
    pub warnings: Vec<PipelineWarning>,
    pub transitions: Vec<TransitionRecord>,
}

impl<T> PipelineReceipt<T> {
    pub(crate) fn new(value: T, outcome: InvocationOutcome) -> Self {
        Self {
            value,
            confirmation: outcome.confirmation,
            hash: outcome.hash,
            prepared_by: outcome.prepared_by,
            warnings: outcome.warnings,
            transitions: outcome.transitions,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmation == Confirmation::Confirmed
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ContractClient {
    orchestrator: Arc<TransactionOrchestrator>,
    cancel: Option<CancellationToken>,
}

impl ContractClient {
    pub(crate) fn new(orchestrator: Arc<TransactionOrchestrator>) -> Self {
        Self {
            orchestrator,
            cancel: None,
        }
    }

    pub(crate) fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancel = Some(token);
    }

    pub(crate) fn orchestrator(&self) -> &Arc<TransactionOrchestrator> {
        &self.orchestrator
    }

    pub(crate) async fn invoke(
        &self,
        call: ContractCall,
        source: &AccountId,
        errors: ContractErrorTable,
        signer: &dyn TransactionSigner,
    ) -> Result<InvocationOutcome, CredentialError> {
        let mut request = InvocationRequest::new(call, source.clone(), errors);
        if let Some(token) = &self.cancel {
            request = request.with_cancellation(token.child_token());
        }
        Ok(self.orchestrator.invoke(request, signer).await?)
    }

    pub(crate) async fn read(
        &self,
        call: ContractCall,
        source: &AccountId,
        errors: ContractErrorTable,
    ) -> Result<MethodResult, CredentialError> {
        Ok(self.orchestrator.simulate_only(call, source, &errors).await?)
    }
}

// ─── Result views ────────────────────────────────────────────────────

fn unexpected(method: &'static str, got: &MethodResult) -> CredentialError {
    CredentialError::UnexpectedResult {
        method,
        detail: format!("{got:?}"),
    }
}

pub(crate) fn expect_bool(method: &'static str, result: MethodResult) -> Result<bool, CredentialError> {
    match result.value().and_then(ScValue::as_bool) {
        Some(b) => Ok(b),
        None => Err(unexpected(method, &result)),
    }
}

pub(crate) fn expect_symbol(method: &'static str, result: MethodResult) -> Result<String, CredentialError> {
    match result {
        MethodResult::Value(ScValue::Symbol(s) | ScValue::String(s)) => Ok(s),
        other => Err(unexpected(method, &other)),
    }
}

pub(crate) fn expect_bytes(method: &'static str, result: MethodResult) -> Result<Vec<u8>, CredentialError> {
    match result {
        MethodResult::Value(ScValue::Bytes(b)) => Ok(b),
        other => Err(unexpected(method, &other)),
    }
}

/// Contract `Option<Address>`: `Void` is `None`.
pub(crate) fn expect_optional_address(
    method: &'static str,
    result: MethodResult,
) -> Result<Option<String>, CredentialError> {
    match result {
        MethodResult::Void => Ok(None),
        MethodResult::Value(ScValue::Address(a)) => Ok(Some(a)),
        other => Err(unexpected(method, &other)),
    }
}

pub(crate) fn expect_void(method: &'static str, result: &MethodResult) -> Result<(), CredentialError> {
    if result.is_void() {
        Ok(())
    } else {
        Err(unexpected(method, result))
    }
}
