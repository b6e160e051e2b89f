//! # Credential Records
//!
//! Read models for what the registry and the compliance oracle store.
//!
//! ## Status
//!
//! ```text
//! Active ──▶ Revoked
//!   │
//!   └──────▶ Expired   (computed on read, never stored)
//! ```
//!
//! Both transitions are one-way. Expiry is evaluated against the caller's
//! clock with the registry's own rule: a credential is live while
//! `expires_at > now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zkid_core::{Commitment, CredentialId, ScValue};

use crate::error::CredentialError;

/// Observed status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Revoked,
    Expired,
}

impl CredentialStatus {
    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// A credential as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: CredentialId,
    /// Account or contract address of the holder.
    pub owner: String,
    pub proof_hash: Commitment,
    /// Unix seconds.
    pub expires_at: u64,
    pub revoked: bool,
}

impl CredentialRecord {
    /// Parse the registry's `Credential` struct value.
    pub fn from_value(id: CredentialId, value: &ScValue) -> Result<Self, CredentialError> {
        let owner = value
            .field("owner")
            .and_then(ScValue::as_address)
            .ok_or_else(|| malformed("owner"))?
            .to_string();
        let proof_hash = value
            .field("proof_hash")
            .and_then(ScValue::as_bytes)
            .ok_or_else(|| malformed("proof_hash"))?;
        let proof_hash = Commitment::from_slice(proof_hash).map_err(|e| {
            CredentialError::UnexpectedResult {
                method: "get_credential",
                detail: format!("proof_hash: {e}"),
            }
        })?;
        let expires_at = value
            .field("expires_at")
            .and_then(ScValue::as_u64)
            .ok_or_else(|| malformed("expires_at"))?;
        let revoked = value
            .field("revoked")
            .and_then(ScValue::as_bool)
            .ok_or_else(|| malformed("revoked"))?;
        Ok(Self {
            id,
            owner,
            proof_hash,
            expires_at,
            revoked,
        })
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.expires_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Revocation takes precedence over expiry.
    pub fn status_at(&self, now: DateTime<Utc>) -> CredentialStatus {
        if self.revoked {
            return CredentialStatus::Revoked;
        }
        let now = u64::try_from(now.timestamp()).unwrap_or(0);
        if self.expires_at > now {
            CredentialStatus::Active
        } else {
            CredentialStatus::Expired
        }
    }

    pub fn status(&self) -> CredentialStatus {
        self.status_at(Utc::now())
    }
}

fn malformed(field: &str) -> CredentialError {
    CredentialError::UnexpectedResult {
        method: "get_credential",
        detail: format!("missing or mistyped field {field}"),
    }
}

/// Compliance explanation attached to a proof hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// `0x`-prefixed hash of the off-chain explanation document.
    pub hash: String,
    /// Where the document can be fetched (IPFS, HTTPS).
    pub uri: Option<String>,
}

impl Explanation {
    pub fn from_value(value: &ScValue) -> Result<Self, CredentialError> {
        let hash = value
            .field("hash")
            .and_then(ScValue::as_bytes)
            .ok_or_else(|| CredentialError::UnexpectedResult {
                method: "get_explanation",
                detail: "missing or mistyped field hash".into(),
            })?;
        let uri = match value.field("uri") {
            None | Some(ScValue::Void) => None,
            Some(ScValue::Bytes(b)) => Some(String::from_utf8_lossy(b).into_owned()),
            Some(ScValue::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(CredentialError::UnexpectedResult {
                    method: "get_explanation",
                    detail: format!("uri has unexpected type {other:?}"),
                })
            }
        };
        Ok(Self {
            hash: format!("0x{}", hex::encode(hash)),
            uri,
        })
    }
}
