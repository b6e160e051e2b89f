//! # Offline Encoding Subcommands
//!
//! Encode proofs and public signals into verifier layout, and fingerprint a
//! proof, without touching the network. Encoding follows the field policy of
//! the active profile.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zkid_core::{encode_proof, encode_signals, hash_proof, signals_from_json, FieldCodec, ProofArtifact};

use crate::{read_json, signals_value};

/// Arguments for `zkid encode-proof`.
#[derive(Args, Debug)]
pub struct EncodeProofArgs {
    /// Groth16 proof JSON (`pi_a`, `pi_b`, `pi_c`).
    pub file: PathBuf,
}

/// Arguments for `zkid encode-signals`.
#[derive(Args, Debug)]
pub struct EncodeSignalsArgs {
    /// Public signals JSON: an array, or an object with `publicSignals`.
    pub file: PathBuf,
}

/// Arguments for `zkid hash-proof`.
#[derive(Args, Debug)]
pub struct HashProofArgs {
    pub proof: PathBuf,
    pub signals: PathBuf,
}

/// Print the encoded proof as `0x`-prefixed hex.
pub fn run_encode_proof(args: &EncodeProofArgs, codec: &FieldCodec) -> Result<u8> {
    let json = read_json(&args.file)?;
    let proof = ProofArtifact::from_json(&json)
        .with_context(|| format!("{} is not a proof artifact", args.file.display()))?;
    let encoded = encode_proof(&proof, codec)?;
    tracing::info!(bytes = encoded.len(), "proof encoded");
    println!("0x{}", encoded.to_hex());
    Ok(0)
}

/// Print the encoded signals as `0x`-prefixed hex.
pub fn run_encode_signals(args: &EncodeSignalsArgs, codec: &FieldCodec) -> Result<u8> {
    let json = signals_value(read_json(&args.file)?);
    let signals = signals_from_json(&json)
        .with_context(|| format!("{} is not a signal list", args.file.display()))?;
    let encoded = encode_signals(&signals, codec)?;
    tracing::info!(signals = encoded.signal_count(), "signals encoded");
    println!("0x{}", encoded.to_hex());
    Ok(0)
}

/// Print the SHA-256 fingerprint of proof and signals.
pub fn run_hash_proof(args: &HashProofArgs) -> Result<u8> {
    let proof = read_json(&args.proof)?;
    let signals = signals_value(read_json(&args.signals)?);
    println!("{}", hash_proof(&proof, &signals)?);
    Ok(0)
}
