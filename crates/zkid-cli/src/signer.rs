//! # External Command Signer
//!
//! Delegates signing to a user-supplied command. The command receives the
//! prepared envelope on stdin and `ZKID_NETWORK_PASSPHRASE` /
//! `ZKID_SIGNER_ADDRESS` in its environment, and prints the signed envelope
//! (bare, or as `{"signedTxXdr": ...}`) on stdout. A non-zero exit is a
//! declined signature.
//!
//! The command line is run through `sh -c`. Dropping the signing future
//! kills the child, so a cancelled pipeline does not leave a prompt behind.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use clap::Args;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use zkid_tx::{Envelope, SignedPayload, SigningContext, SigningError, TransactionSigner};

/// Signer selection shared by every signed subcommand.
#[derive(Args, Debug, Clone)]
pub struct SignerArgs {
    /// Command that signs the envelope read from stdin.
    #[arg(long, env = "ZKID_SIGNER_CMD")]
    pub signer_cmd: String,
}

impl SignerArgs {
    pub fn signer(&self) -> CommandSigner {
        CommandSigner::shell(&self.signer_cmd)
    }
}

#[derive(Debug, Clone)]
pub struct CommandSigner {
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run `command_line` through the POSIX shell.
    pub fn shell(command_line: &str) -> Self {
        Self::new("sh", vec!["-c".to_string(), command_line.to_string()])
    }
}

#[async_trait]
impl TransactionSigner for CommandSigner {
    async fn sign(&self, envelope: &Envelope, ctx: &SigningContext) -> Result<SignedPayload, SigningError> {
        tracing::info!(signer = %ctx.address, "requesting signature from external command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("ZKID_NETWORK_PASSPHRASE", &ctx.network_passphrase)
            .env("ZKID_SIGNER_ADDRESS", ctx.address.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SigningError::Failed(format!("cannot start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A signer may answer without reading stdin; its output decides.
            match stdin.write_all(envelope.as_str().as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("signer closed stdin before reading the envelope");
                }
                Err(e) => return Err(SigningError::Failed(format!("writing envelope to signer: {e}"))),
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SigningError::Failed(format!("waiting for signer: {e}")))?;
        if !output.status.success() {
            return Err(SigningError::Declined(format!("signer exited with {}", output.status)));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| SigningError::Malformed(format!("signer output is not UTF-8: {e}")))?;
        SignedPayload::parse(&text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use zkid_core::AccountId;

    use super::*;

    fn ctx() -> SigningContext {
        SigningContext {
            network_passphrase: "Test SDF Network ; September 2015".into(),
            address: AccountId::parse(&format!("G{}", "A".repeat(55))).unwrap(),
        }
    }

    #[tokio::test]
    async fn echoes_envelope_from_stdin() {
        let signer = CommandSigner::shell("cat");
        let out = signer.sign(&Envelope::from_base64("AAAA"), &ctx()).await.unwrap();
        assert_eq!(out.into_envelope().unwrap().as_str(), "AAAA");
    }

    #[tokio::test]
    async fn passes_network_passphrase_in_environment() {
        let signer = CommandSigner::shell(r#"printf '{"signedTxXdr":"%s"}' "$ZKID_NETWORK_PASSPHRASE""#);
        let out = signer.sign(&Envelope::from_base64("AAAA"), &ctx()).await.unwrap();
        assert_eq!(
            out.into_envelope().unwrap().as_str(),
            "Test SDF Network ; September 2015"
        );
    }

    #[tokio::test]
    async fn signer_that_ignores_stdin_still_succeeds() {
        let big = Envelope::from_base64(&"A".repeat(1 << 20));
        for _ in 0..5 {
            let signer = CommandSigner::shell("exec 0<&-; printf SIGNED");
            let out = signer.sign(&big, &ctx()).await.unwrap();
            assert_eq!(out.into_envelope().unwrap().as_str(), "SIGNED");
        }
    }

    #[tokio::test]
    async fn non_zero_exit_is_declined() {
        let signer = CommandSigner::shell("cat >/dev/null; exit 3");
        let err = signer.sign(&Envelope::from_base64("AAAA"), &ctx()).await.unwrap_err();
        assert!(matches!(err, SigningError::Declined(_)));
    }

    #[tokio::test]
    async fn empty_output_is_rejected() {
        let signer = CommandSigner::shell("cat >/dev/null");
        let out = signer.sign(&Envelope::from_base64("AAAA"), &ctx()).await.unwrap();
        assert_eq!(out.into_envelope(), Err(SigningError::Empty));
    }
}
