//! # Canonical Serialization — Proof Hashing
//!
//! `CanonicalBytes` is the only input accepted by [`hash_proof`]. Its sole
//! constructor rejects floats and serializes with `serde_jcs` (RFC 8785:
//! sorted keys, compact separators), so two semantically equal proofs always
//! hash to the same digest regardless of key order or whitespace.

use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::{CanonicalizationError, EncodingError};

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integral number.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        Ok(Self(serde_jcs::to_string(&value)?.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => Err(CanonicalizationError::FloatRejected(f)),
            None => Ok(()),
        },
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

/// SHA-256 over canonical bytes, lowercase hex.
pub fn sha256_hex(bytes: &CanonicalBytes) -> String {
    hex::encode(Sha256::digest(bytes.as_bytes()))
}

/// Deterministic off-chain digest of a proof and its public signals.
///
/// Hashes the canonical form of `{"proof": ..., "publicSignals": ...}`.
/// Used for caching and deduplication; the contract never sees it.
pub fn hash_proof(proof: &Value, public_signals: &Value) -> Result<String, EncodingError> {
    let doc = json!({ "proof": proof, "publicSignals": public_signals });
    Ok(sha256_hex(&CanonicalBytes::new(&doc)?))
}
