//! # Registry and Endpoint Queries
//!
//! Simulate-only reads. Nothing here signs or submits. A negative answer
//! (revoked, expired, not found, unhealthy) exits with [`EXIT_NEGATIVE`].

use anyhow::{Context, Result};
use clap::Args;
use zkid_core::{AccountId, CredentialId};
use zkid_credentials::{CredentialLifecycleManager, CredentialRecord, NetworkConfig};
use zkid_rpc::RpcGateway;

use crate::EXIT_NEGATIVE;

/// Account that read-only simulations are built against.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Overrides `ZKID_SIMULATION_SOURCE` and the profile's `simulation_source`.
    #[arg(long)]
    pub source: Option<String>,
}

impl SourceArgs {
    pub fn apply(&self, config: &mut NetworkConfig) -> Result<()> {
        if let Some(raw) = &self.source {
            let account = AccountId::parse(raw).with_context(|| format!("--source {raw:?}"))?;
            config.simulation_source = Some(account);
        }
        Ok(())
    }
}

/// Arguments for `zkid status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    pub credential_id: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for `zkid credential`.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    pub credential_id: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Print `ACTIVE`, `REVOKED`, `EXPIRED` or `NOT FOUND` for a credential.
pub async fn run_status(args: &StatusArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let id = parse_credential_id(&args.credential_id)?;
    let Some(record) = manager.get_credential(&id).await? else {
        println!("NOT FOUND: {}", id.short());
        return Ok(EXIT_NEGATIVE);
    };
    let status = record.status();
    println!("{status}: {} {}", id.short(), describe(&record));
    Ok(if status.is_active() { 0 } else { EXIT_NEGATIVE })
}

/// Print the stored credential record as JSON.
pub async fn run_credential(args: &CredentialArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let id = parse_credential_id(&args.credential_id)?;
    match manager.get_credential(&id).await? {
        Some(record) => {
            let mut json = serde_json::to_value(&record)?;
            json["status"] = serde_json::Value::String(record.status().to_string());
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(0)
        }
        None => {
            println!("NOT FOUND: {}", id.short());
            Ok(EXIT_NEGATIVE)
        }
    }
}

/// Ask the configured RPC endpoint whether it is healthy.
pub async fn run_health(config: &NetworkConfig) -> Result<u8> {
    let gateway = RpcGateway::new(&config.rpc)?;
    let health = gateway.get_health().await?;
    let ledger = health
        .latest_ledger
        .map(|l| format!(" (latest ledger {l})"))
        .unwrap_or_default();
    if health.is_healthy() {
        println!("OK: {} is {}{ledger}", config.rpc.url, health.status);
        Ok(0)
    } else {
        println!("UNHEALTHY: {} reports {:?}{ledger}", config.rpc.url, health.status);
        Ok(EXIT_NEGATIVE)
    }
}

fn parse_credential_id(raw: &str) -> Result<CredentialId> {
    CredentialId::from_hex(raw).with_context(|| format!("{raw:?} is not a hex credential id"))
}

fn describe(record: &CredentialRecord) -> String {
    let expires = record
        .expires_at_utc()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.expires_at.to_string());
    format!("owner={} expires={expires}", record.owner)
}

#[cfg(test)]
mod tests {
    use zkid_core::Commitment;

    use super::*;

    #[test]
    fn source_override_replaces_profile_account() {
        let mut cfg = NetworkConfig::local_mock("http://127.0.0.1:9").unwrap();
        let account = format!("G{}", "B".repeat(55));
        let args = SourceArgs {
            source: Some(account.clone()),
        };
        args.apply(&mut cfg).unwrap();
        assert_eq!(cfg.simulation_source.as_ref().unwrap().as_str(), account);
    }

    #[test]
    fn invalid_source_is_rejected() {
        let mut cfg = NetworkConfig::local_mock("http://127.0.0.1:9").unwrap();
        let args = SourceArgs {
            source: Some("alice".into()),
        };
        assert!(args.apply(&mut cfg).is_err());
    }

    #[test]
    fn description_renders_expiry_as_timestamp() {
        let record = CredentialRecord {
            id: CredentialId::from_bytes(vec![0xab; 32]),
            owner: format!("G{}", "C".repeat(55)),
            proof_hash: Commitment::from_bytes([0xab; 32]),
            expires_at: 0,
            revoked: false,
        };
        assert!(describe(&record).contains("expires=1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn credential_id_must_be_hex() {
        assert!(parse_credential_id("not-hex").is_err());
        assert!(parse_credential_id("0xabcd").is_ok());
    }
}
