//! # Signer Seam
//!
//! Signing is external: a wallet, an HSM, or a co-signing service. The
//! pipeline hands a [`TransactionSigner`] the prepared envelope plus the
//! network passphrase and accepts either a bare signed envelope or a
//! `{ "signedTxXdr": ... }` object back.

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkid_core::AccountId;

use crate::envelope::Envelope;
use crate::error::SigningError;

/// What the signer is told about the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningContext {
    pub network_passphrase: String,
    /// The account expected to sign (the transaction source).
    pub address: AccountId,
}

/// Signer output in either of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignedPayload {
    Envelope(String),
    Wrapped {
        #[serde(rename = "signedTxXdr")]
        signed_tx_xdr: String,
        #[serde(rename = "signerAddress", default, skip_serializing_if = "Option::is_none")]
        signer_address: Option<String>,
    },
}

impl SignedPayload {
    /// Parse signer stdout-style text: a JSON object, a JSON string, or a raw envelope.
    pub fn parse(text: &str) -> Result<Self, SigningError> {
        let trimmed = text.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('"') {
            serde_json::from_str(trimmed).map_err(|e| SigningError::Malformed(e.to_string()))
        } else {
            Ok(Self::Envelope(trimmed.to_string()))
        }
    }

    /// Normalize to an envelope, rejecting empty output.
    pub fn into_envelope(self) -> Result<Envelope, SigningError> {
        let raw = match self {
            Self::Envelope(s) => s,
            Self::Wrapped { signed_tx_xdr, .. } => signed_tx_xdr,
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SigningError::Empty);
        }
        Ok(Envelope::from_base64(raw))
    }
}

impl From<Envelope> for SignedPayload {
    fn from(envelope: Envelope) -> Self {
        Self::Envelope(envelope.into_string())
    }
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, envelope: &Envelope, ctx: &SigningContext) -> Result<SignedPayload, SigningError>;
}

/// Adapts an async closure into a [`TransactionSigner`].
pub struct FnSigner<F>(pub F);

#[async_trait]
impl<F, Fut> TransactionSigner for FnSigner<F>
where
    F: Fn(Envelope, SigningContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SignedPayload, SigningError>> + Send,
{
    async fn sign(&self, envelope: &Envelope, ctx: &SigningContext) -> Result<SignedPayload, SigningError> {
        (self.0)(envelope.clone(), ctx.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_wrapped_forms() {
        assert_eq!(
            SignedPayload::parse("AAAA").unwrap().into_envelope().unwrap().as_str(),
            "AAAA"
        );
        assert_eq!(
            SignedPayload::parse(r#"{"signedTxXdr":"BBBB","signerAddress":"GX"}"#)
                .unwrap()
                .into_envelope()
                .unwrap()
                .as_str(),
            "BBBB"
        );
        assert_eq!(
            SignedPayload::parse(r#""CCCC""#).unwrap().into_envelope().unwrap().as_str(),
            "CCCC"
        );
    }

    #[test]
    fn empty_output_is_rejected() {
        assert_eq!(SignedPayload::parse("  ").unwrap().into_envelope(), Err(SigningError::Empty));
        assert!(matches!(
            SignedPayload::parse("{not json"),
            Err(SigningError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn closure_signer_receives_context() {
        let signer = FnSigner(|env: Envelope, ctx: SigningContext| async move {
            assert_eq!(ctx.network_passphrase, "net");
            Ok::<_, SigningError>(SignedPayload::from(env))
        });
        let ctx = SigningContext {
            network_passphrase: "net".into(),
            address: AccountId::parse(&format!("G{}", "A".repeat(55))).unwrap(),
        };
        let out = signer.sign(&Envelope::from_base64("ENV"), &ctx).await.unwrap();
        assert_eq!(out, SignedPayload::Envelope("ENV".into()));
    }
}
