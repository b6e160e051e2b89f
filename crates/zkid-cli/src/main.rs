//! # zkid CLI entry point
//!
//! Parses command-line arguments, resolves the network profile, and
//! dispatches to subcommand handlers. Network subcommands run on a tokio
//! runtime; Ctrl-C cancels any signing prompt in flight.

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkid_cli::admin::{run_set_vk, run_verification_key, SetVkArgs, VerificationKeyArgs};
use zkid_cli::compliance::{run_explanation, run_sanctions, ExplanationArgs, SanctionsArgs};
use zkid_cli::encode::{
    run_encode_proof, run_encode_signals, run_hash_proof, EncodeProofArgs, EncodeSignalsArgs, HashProofArgs,
};
use zkid_cli::lifecycle::{
    run_issue, run_revoke, run_verify, run_verify_and_issue, IssueArgs, RevokeArgs, VerifyAndIssueArgs,
    VerifyArgs,
};
use zkid_cli::query::{run_credential, run_health, run_status, CredentialArgs, SourceArgs, StatusArgs};
use zkid_cli::{load_network_config, NetworkArg};
use zkid_core::FieldCodec;
use zkid_credentials::{CredentialLifecycleManager, NetworkConfig};
use zkid_tx::CancellationToken;

/// zkid: zero-knowledge proof to on-chain credential.
///
/// Encodes Groth16 proofs and public signals for the on-chain verifier,
/// drives the verify and issue transactions through an external signer,
/// and queries the credential registry and compliance oracle.
#[derive(Parser, Debug)]
#[command(name = "zkid", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to a YAML network profile.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target network when no profile is given.
    #[arg(long, global = true, value_enum, env = "ZKID_NETWORK")]
    network: Option<NetworkArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a proof JSON into the verifier's 256-byte layout.
    EncodeProof(EncodeProofArgs),

    /// Encode public signals into 32-byte big-endian words.
    EncodeSignals(EncodeSignalsArgs),

    /// SHA-256 fingerprint of a proof and its public signals.
    HashProof(HashProofArgs),

    /// Submit a proof to the verifier contract.
    Verify(VerifyArgs),

    /// Issue a credential from a verification commitment.
    Issue(IssueArgs),

    /// Verify a proof, then issue a credential from its commitment.
    VerifyAndIssue(VerifyAndIssueArgs),

    /// Revoke a credential you own.
    Revoke(RevokeArgs),

    /// Print whether a credential is active, revoked or expired.
    Status(StatusArgs),

    /// Print a credential record as JSON.
    Credential(CredentialArgs),

    /// Check a proof hash against the sanctions list.
    Sanctions(SanctionsArgs),

    /// Print the compliance explanation attached to a proof hash.
    Explanation(ExplanationArgs),

    /// Install the verifier's verification key.
    SetVk(SetVkArgs),

    /// Print the verifier's stored verification key.
    VerificationKey(VerificationKeyArgs),

    /// Check that the RPC endpoint is healthy.
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "zkid CLI starting");

    match dispatch(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(cli: &Cli) -> Result<u8> {
    match &cli.command {
        Commands::EncodeProof(args) => run_encode_proof(args, &offline_codec(cli)?),
        Commands::EncodeSignals(args) => run_encode_signals(args, &offline_codec(cli)?),
        Commands::HashProof(args) => run_hash_proof(args),
        Commands::Verify(args) => with_manager(cli, None, |m| async move { run_verify(args, &m).await }),
        Commands::Issue(args) => with_manager(cli, None, |m| async move { run_issue(args, &m).await }),
        Commands::VerifyAndIssue(args) => {
            with_manager(cli, None, |m| async move { run_verify_and_issue(args, &m).await })
        }
        Commands::Revoke(args) => with_manager(cli, None, |m| async move { run_revoke(args, &m).await }),
        Commands::Status(args) => {
            with_manager(cli, Some(&args.source), |m| async move { run_status(args, &m).await })
        }
        Commands::Credential(args) => {
            with_manager(cli, Some(&args.source), |m| async move { run_credential(args, &m).await })
        }
        Commands::Sanctions(args) => with_manager(cli, Some(&args.source), |m| async move {
            run_sanctions(args, &m.compliance()).await
        }),
        Commands::Explanation(args) => with_manager(cli, Some(&args.source), |m| async move {
            run_explanation(args, &m.compliance()).await
        }),
        Commands::SetVk(args) => with_manager(cli, None, |m| async move { run_set_vk(args, &m).await }),
        Commands::VerificationKey(args) => {
            with_manager(cli, Some(&args.source), |m| async move { run_verification_key(&m).await })
        }
        Commands::Health => {
            let config = network_config(cli, None)?;
            runtime()?.block_on(run_health(&config))
        }
    }
}

/// Encoding follows the profile's field policy when `--config` is given.
fn offline_codec(cli: &Cli) -> Result<FieldCodec> {
    match &cli.config {
        Some(_) => Ok(network_config(cli, None)?.codec()),
        None => Ok(FieldCodec::default()),
    }
}

fn network_config(cli: &Cli, source: Option<&SourceArgs>) -> Result<NetworkConfig> {
    let mut config = load_network_config(cli.config.as_deref(), cli.network)?;
    if let Some(source) = source {
        source.apply(&mut config)?;
    }
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread().enable_all().build()?)
}

/// Build a manager for the resolved profile and run `f` to completion.
fn with_manager<F, Fut>(cli: &Cli, source: Option<&SourceArgs>, f: F) -> Result<u8>
where
    F: FnOnce(CredentialLifecycleManager) -> Fut,
    Fut: Future<Output = Result<u8>>,
{
    let config = network_config(cli, source)?;
    let rt = runtime()?;
    rt.block_on(async move {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling pending signature requests");
                on_interrupt.cancel();
            }
        });
        let manager = CredentialLifecycleManager::new(config)?.with_cancellation(cancel);
        f(manager).await
    })
}
