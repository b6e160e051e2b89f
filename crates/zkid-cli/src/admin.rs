//! # Verifier Administration
//!
//! `zkid set-vk` installs the verification key from a prover toolchain's
//! `verification_key.json`; `zkid verification-key` prints what is stored.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zkid_core::VerificationKey;
use zkid_credentials::CredentialLifecycleManager;

use crate::lifecycle::{confirmation_suffix, parse_account};
use crate::query::SourceArgs;
use crate::signer::SignerArgs;
use crate::{read_json, EXIT_NEGATIVE};

/// Arguments for `zkid set-vk`.
#[derive(Args, Debug)]
pub struct SetVkArgs {
    /// Account that signs and pays for the update.
    #[arg(long)]
    pub admin: String,
    /// Path to `verification_key.json`.
    #[arg(long)]
    pub vk: PathBuf,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `zkid verification-key`.
#[derive(Args, Debug)]
pub struct VerificationKeyArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub async fn run_set_vk(args: &SetVkArgs, manager: &CredentialLifecycleManager) -> Result<u8> {
    let admin = parse_account(&args.admin)?;
    let vk = VerificationKey::from_json(&read_json(&args.vk)?)
        .with_context(|| format!("{} is not a verification key", args.vk.display()))?;
    let receipt = manager
        .set_verification_key(&admin, &vk, &args.signer.signer())
        .await?;
    println!(
        "OK: verification key set ({} public inputs){}",
        vk.public_inputs(),
        confirmation_suffix(&receipt)
    );
    Ok(0)
}

/// Print the stored key as tagged JSON, or `NOT SET`.
pub async fn run_verification_key(manager: &CredentialLifecycleManager) -> Result<u8> {
    match manager.get_verification_key().await? {
        Some(vk) => {
            println!("{}", serde_json::to_string_pretty(&vk)?);
            Ok(0)
        }
        None => {
            println!("NOT SET: the verifier has no verification key");
            Ok(EXIT_NEGATIVE)
        }
    }
}
