//! # Ledger Client Seam
//!
//! [`LedgerClient`] is the boundary between the pipeline and the ledger's
//! transaction tooling: account lookup, dry runs, and local assembly of a
//! simulated transaction. [`RpcLedgerClient`] implements it over the JSON-RPC
//! gateway and the canonical draft envelope.

use async_trait::async_trait;
use zkid_core::{AccountId, ScValue};
use zkid_rpc::{Footprint, RpcGateway};

use crate::envelope::Envelope;
use crate::error::TxError;

/// Current state of a source account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub sequence: u64,
}

/// Outcome of a successful dry run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simulation {
    pub return_value: Option<ScValue>,
    pub footprint: Option<Footprint>,
    pub min_resource_fee: Option<u64>,
    pub latest_ledger: Option<u64>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn load_account(&self, account: &AccountId) -> Result<Account, TxError>;

    /// Dry-run an envelope. A host rejection is `TxError::Simulation`.
    async fn simulate(&self, envelope: &Envelope) -> Result<Simulation, TxError>;

    /// Attach the simulation's footprint and resource fee without the endpoint's help.
    async fn assemble(&self, envelope: &Envelope, simulation: &Simulation) -> Result<Envelope, TxError>;
}

/// [`LedgerClient`] over the JSON-RPC gateway.
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    gateway: RpcGateway,
}

impl RpcLedgerClient {
    pub fn new(gateway: RpcGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn load_account(&self, account: &AccountId) -> Result<Account, TxError> {
        let resp = self.gateway.get_account(account.as_str()).await?;
        let sequence = resp.sequence.parse().map_err(|_| TxError::Sequence {
            account: account.to_string(),
            sequence: resp.sequence.clone(),
        })?;
        Ok(Account {
            id: account.clone(),
            sequence,
        })
    }

    async fn simulate(&self, envelope: &Envelope) -> Result<Simulation, TxError> {
        let resp = self.gateway.simulate_transaction(envelope.as_str()).await?;
        if let Some(message) = resp.error {
            return Err(TxError::Simulation { message });
        }
        Ok(Simulation {
            return_value: resp.retval,
            footprint: resp.footprint,
            min_resource_fee: resp.min_resource_fee,
            latest_ledger: resp.latest_ledger,
        })
    }

    async fn assemble(&self, envelope: &Envelope, simulation: &Simulation) -> Result<Envelope, TxError> {
        let mut draft = envelope.decode()?;
        let footprint = simulation
            .footprint
            .clone()
            .ok_or_else(|| TxError::Preparation("simulation carried no footprint".into()))?;
        let resource_fee = simulation.min_resource_fee.unwrap_or(0);
        draft.footprint = Some(footprint);
        draft.resource_fee = Some(resource_fee);
        draft.fee = draft.fee.saturating_add(resource_fee);
        Envelope::encode(&draft)
    }
}
