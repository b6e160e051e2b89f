//! # Tiered Transaction Preparation
//!
//! Preparation attaches the footprint and resource fee a transaction needs
//! to be accepted. It is attempted through an ordered list of strategies;
//! the first that yields an envelope wins. When every tier fails the
//! original envelope is used and the outcome records the degradation.
//!
//! ## Tiers
//!
//! 1. [`RpcPrepare`]: the endpoint's own `prepareTransaction`.
//! 2. [`LocalAssemble`]: local assembly from the simulation result.
//! 3. Unprepared: the built envelope, unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkid_rpc::RpcGateway;

use crate::envelope::Envelope;
use crate::ledger::{LedgerClient, Simulation};

/// Which strategy produced the envelope that went to the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepareTier {
    RpcPrepare,
    LocalAssemble,
    Unprepared,
}

impl std::fmt::Display for PrepareTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RpcPrepare => "rpc_prepare",
            Self::LocalAssemble => "local_assemble",
            Self::Unprepared => "unprepared",
        };
        f.write_str(s)
    }
}

/// One way of preparing an envelope. `None` means "try the next tier".
#[async_trait]
pub trait PrepareStrategy: Send + Sync {
    fn tier(&self) -> PrepareTier;

    async fn try_prepare(&self, envelope: &Envelope, simulation: &Simulation) -> Option<Envelope>;
}

/// Delegates to the endpoint's `prepareTransaction`.
#[derive(Debug, Clone)]
pub struct RpcPrepare {
    gateway: RpcGateway,
}

impl RpcPrepare {
    pub fn new(gateway: RpcGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PrepareStrategy for RpcPrepare {
    fn tier(&self) -> PrepareTier {
        PrepareTier::RpcPrepare
    }

    async fn try_prepare(&self, envelope: &Envelope, _simulation: &Simulation) -> Option<Envelope> {
        match self.gateway.prepare_transaction(envelope.as_str()).await {
            Ok(Some(prepared)) => Some(Envelope::from_base64(prepared)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "endpoint prepare failed");
                None
            }
        }
    }
}

/// Assembles locally from the simulation result.
#[derive(Clone)]
pub struct LocalAssemble {
    ledger: Arc<dyn LedgerClient>,
}

impl LocalAssemble {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl PrepareStrategy for LocalAssemble {
    fn tier(&self) -> PrepareTier {
        PrepareTier::LocalAssemble
    }

    async fn try_prepare(&self, envelope: &Envelope, simulation: &Simulation) -> Option<Envelope> {
        match self.ledger.assemble(envelope, simulation).await {
            Ok(prepared) => Some(prepared),
            Err(e) => {
                tracing::warn!(error = %e, "local assembly failed");
                None
            }
        }
    }
}

/// Result of running the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub envelope: Envelope,
    pub tier: PrepareTier,
    /// Tiers tried before a winner (or all of them, when unprepared).
    pub attempted: Vec<PrepareTier>,
}

impl Prepared {
    pub fn is_degraded(&self) -> bool {
        self.tier == PrepareTier::Unprepared
    }
}

/// Ordered list of strategies.
#[derive(Default)]
pub struct PrepareChain {
    strategies: Vec<Box<dyn PrepareStrategy>>,
}

impl PrepareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint prepare first, then local assembly.
    pub fn standard(gateway: RpcGateway, ledger: Arc<dyn LedgerClient>) -> Self {
        Self::new()
            .with(RpcPrepare::new(gateway))
            .with(LocalAssemble::new(ledger))
    }

    pub fn with(mut self, strategy: impl PrepareStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn tiers(&self) -> Vec<PrepareTier> {
        self.strategies.iter().map(|s| s.tier()).collect()
    }

    /// Run each tier in order. Never fails.
    pub async fn prepare(&self, envelope: &Envelope, simulation: &Simulation) -> Prepared {
        let mut attempted = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            attempted.push(strategy.tier());
            if let Some(prepared) = strategy.try_prepare(envelope, simulation).await {
                tracing::debug!(tier = %strategy.tier(), "envelope prepared");
                return Prepared {
                    envelope: prepared,
                    tier: strategy.tier(),
                    attempted,
                };
            }
        }
        Prepared {
            envelope: envelope.clone(),
            tier: PrepareTier::Unprepared,
            attempted,
        }
    }
}

impl std::fmt::Debug for PrepareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrepareChain")
            .field("tiers", &self.tiers())
            .finish()
    }
}
