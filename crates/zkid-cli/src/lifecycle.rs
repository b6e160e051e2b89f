//! # Lifecycle Subcommands
//!
//! Signed calls: `verify`, `issue`, `verify-and-issue`, `revoke`. Each one
//! prints an `OK:` line with the result, and marks results that were never
//! confirmed on the ledger as `UNCONFIRMED`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use zkid_core::{signals_from_json, AccountId, CredentialId, FieldInput, ProofArtifact};
use zkid_credentials::{CredentialLifecycleManager, PipelineReceipt, UnconfirmedPolicy};

use crate::signer::SignerArgs;
use crate::{read_json, signals_value};

/// Arguments for `zkid verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Identity the commitment is bound to; also the transaction source.
    #[arg(long)]
    pub caller: String,
    #[arg(long)]
    pub proof: PathBuf,
    #[arg(long)]
    pub signals: PathBuf,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `zkid issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    #[arg(long)]
    pub owner: String,
    /// 32-byte commitment returned by `verify`, hex with or without `0x`.
    #[arg(long)]
    pub commitment: String,
    /// Credential lifetime in seconds (default: the profile's, 365 days).
    #[arg(long)]
    pub ttl: Option<u32>,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `zkid verify-and-issue`.
#[derive(Args, Debug)]
pub struct VerifyAndIssueArgs {
    #[arg(long)]
    pub caller: String,
    #[arg(long)]
    pub proof: PathBuf,
    #[arg(long)]
    pub signals: PathBuf,
    #[arg(long)]
    pub ttl: Option<u32>,
    /// Do not issue if the verify transaction was not confirmed.
    #[arg(long)]
    pub require_confirmed: bool,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `zkid revoke`.
#[derive(Args, Debug)]
pub struct RevokeArgs {
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub credential_id: String,
    #[command(flatten)]
    pub signer: SignerArgs,
}

pub async fn run_verify(args: &VerifyArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let caller = parse_account(&args.caller)?;
    let (proof, signals) = load_inputs(&args.proof, &args.signals)?;
    let receipt = manager
        .verify(&caller, &proof, &signals, &args.signer.signer())
        .await?;
    println!("OK: commitment {}{}", receipt.value, confirmation_suffix(&receipt));
    Ok(0)
}

pub async fn run_issue(args: &IssueArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let owner = parse_account(&args.owner)?;
    let ttl = args.ttl.unwrap_or(manager.config().default_ttl_secs);
    let receipt = manager
        .issue(&owner, &args.commitment, ttl, &args.signer.signer())
        .await?;
    println!(
        "OK: credential {} ({}){}",
        receipt.value,
        receipt.value.short(),
        confirmation_suffix(&receipt)
    );
    Ok(0)
}

pub async fn run_verify_and_issue(args: &VerifyAndIssueArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let caller = parse_account(&args.caller)?;
    let (proof, signals) = load_inputs(&args.proof, &args.signals)?;
    let policy = if args.require_confirmed {
        UnconfirmedPolicy::Refuse
    } else {
        UnconfirmedPolicy::Proceed
    };
    let out = manager
        .verify_and_issue(&caller, &proof, &signals, args.ttl, policy, &args.signer.signer())
        .await?;
    println!("OK: commitment {}{}", out.commitment, confirmation_suffix(&out.verify));
    println!(
        "OK: credential {} ({}){}",
        out.credential_id,
        out.credential_id.short(),
        confirmation_suffix(&out.issue)
    );
    Ok(0)
}

pub async fn run_revoke(args: &RevokeArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let owner = parse_account(&args.owner)?;
    let id = CredentialId::from_hex(&args.credential_id).context("invalid credential id")?;
    let receipt = manager.revoke(&owner, &id, &args.signer.signer()).await?;
    println!("OK: revoked {}{}", id.short(), confirmation_suffix(&receipt));
    Ok(0)
}

pub(crate) fn parse_account(raw: &str) -> Result<AccountId> {
    AccountId::parse(raw).with_context(|| format!("{raw:?} is not an account address"))
}

fn load_inputs(proof: &Path, signals: &Path) -> Result<(ProofArtifact, Vec<FieldInput>)> {
    let proof_json = read_json(proof)?;
    let proof = ProofArtifact::from_json(&proof_json)
        .with_context(|| format!("{} is not a proof artifact", proof.display()))?;
    let signals_json = signals_value(read_json(signals)?);
    let signals = signals_from_json(&signals_json)
        .with_context(|| format!("{} is not a signal list", signals.display()))?;
    Ok((proof, signals))
}

pub(crate) fn confirmation_suffix<T>(receipt: &PipelineReceipt<T>) -> String {
    for warning in &receipt.warnings {
        eprintln!("WARN: {warning}");
    }
    let hash = receipt.hash.as_deref().unwrap_or("-");
    if receipt.is_confirmed() {
        format!(" [tx {hash}]")
    } else {
        format!(" [tx {hash} UNCONFIRMED]")
    }
}
