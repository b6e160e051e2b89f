//! # Ledger Identity Newtypes
//!
//! Newtype wrappers for account addresses, contract addresses, verification
//! commitments and credential identifiers. You cannot pass a `ContractId`
//! where an `AccountId` is expected, and a `Commitment` is always 32 bytes.
//!
//! ## Security Invariant
//!
//! Validation happens at construction. Every commitment that reaches the
//! registry contract has passed the length check here, before any network
//! call is made.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, IdentityError};

/// Length of a strkey-encoded account or contract address.
pub const STRKEY_LEN: usize = 56;

/// Byte length of a verification commitment.
pub const COMMITMENT_LEN: usize = 32;

fn is_strkey(s: &str, version: char) -> bool {
    s.len() == STRKEY_LEN
        && s.starts_with(version)
        && s.bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}

/// A ledger account address (`G...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let s = s.trim();
        if is_strkey(s, 'G') {
            Ok(Self(s.to_string()))
        } else {
            Err(IdentityError::InvalidAccountId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A deployed contract address (`C...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId(String);

impl ContractId {
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let s = s.trim();
        if is_strkey(s, 'C') {
            Ok(Self(s.to_string()))
        } else {
            Err(IdentityError::InvalidContractId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! strkey_conversions {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = IdentityError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = IdentityError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

strkey_conversions!(AccountId);
strkey_conversions!(ContractId);

// ─── Commitment ─────────────────────────────────────────────────────

/// The 32-byte value the verifier returns for an accepted proof.
///
/// Displays as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment([u8; COMMITMENT_LEN]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; COMMITMENT_LEN]) -> Self {
        Self(bytes)
    }

    /// Accept exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
        let arr: [u8; COMMITMENT_LEN] =
            bytes
                .try_into()
                .map_err(|_| EncodingError::InvalidLength {
                    expected: COMMITMENT_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Parse hex with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Commitment {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Commitment {
    type Error = EncodingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> Self {
        c.to_hex()
    }
}

// ─── Credential id ──────────────────────────────────────────────────

/// Identifier the registry assigns to an issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialId(Vec<u8>);

impl CredentialId {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(hex::decode(digits)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Short display label: `cred_` plus the first 12 hex digits.
    pub fn short(&self) -> String {
        let digits = hex::encode(&self.0);
        let end = digits.len().min(12);
        format!("cred_{}", &digits[..end])
    }
}

impl From<Commitment> for CredentialId {
    fn from(c: Commitment) -> Self {
        Self(c.0.to_vec())
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CredentialId {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for CredentialId {
    type Error = EncodingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<CredentialId> for String {
    fn from(id: CredentialId) -> Self {
        id.to_hex()
    }
}
