//! # Compliance Oracle Queries
//!
//! `zkid sanctions` and `zkid explanation`, keyed by a proof hash
//! (the 32-byte commitment the verifier returned).

use anyhow::{Context, Result};
use clap::Args;
use zkid_core::Commitment;
use zkid_credentials::ComplianceOracleClient;

use crate::query::SourceArgs;
use crate::EXIT_NEGATIVE;

/// Arguments for `zkid sanctions`.
#[derive(Args, Debug)]
pub struct SanctionsArgs {
    pub proof_hash: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for `zkid explanation`.
#[derive(Args, Debug)]
pub struct ExplanationArgs {
    pub proof_hash: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Exit 0 when the proof hash is clear, [`EXIT_NEGATIVE`] when sanctioned.
pub async fn run_sanctions(args: &SanctionsArgs, oracle: &ComplianceOracleClient) -> Result<u8> {
    let proof_hash = parse_proof_hash(&args.proof_hash)?;
    if oracle.check_sanctions(&proof_hash).await? {
        println!("SANCTIONED: {proof_hash}");
        Ok(EXIT_NEGATIVE)
    } else {
        println!("CLEAR: {proof_hash}");
        Ok(0)
    }
}

pub async fn run_explanation(args: &ExplanationArgs, oracle: &ComplianceOracleClient) -> Result<u8> {
    let proof_hash = parse_proof_hash(&args.proof_hash)?;
    match oracle.get_explanation(&proof_hash).await? {
        Some(explanation) => {
            println!("hash: {}", explanation.hash);
            println!("uri:  {}", explanation.uri.as_deref().unwrap_or("-"));
            Ok(0)
        }
        None => {
            println!("NOT FOUND: no explanation for {proof_hash}");
            Ok(EXIT_NEGATIVE)
        }
    }
}

fn parse_proof_hash(raw: &str) -> Result<Commitment> {
    Commitment::from_hex(raw).with_context(|| format!("{raw:?} is not a 32-byte proof hash"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_hash_must_be_32_bytes() {
        assert!(parse_proof_hash(&"ab".repeat(32)).is_ok());
        assert!(parse_proof_hash(&format!("0x{}", "ab".repeat(32))).is_ok());
        let err = parse_proof_hash("abcd").unwrap_err();
        assert!(err.to_string().contains("32-byte"));
    }
}
