//! # Contract Values — Typed Arguments and Return Values
//!
//! `ScValue` models the subset of ledger contract values the credential
//! contracts exchange: booleans, integers, byte strings, symbols, addresses,
//! vectors, maps and the `Result` envelope contracts use for typed errors.
//!
//! On the wire values are adjacently tagged JSON (`{"type": "bytes",
//! "value": "ab01..."}`), with byte strings as lowercase hex.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{AccountId, Commitment};

/// A contract argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScValue {
    Void,
    Bool(bool),
    U32(u32),
    U64(u64),
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
    Symbol(String),
    String(String),
    Address(String),
    Vec(Vec<ScValue>),
    Map(BTreeMap<String, ScValue>),
    /// Successful `Result` wrapper.
    Ok(Box<ScValue>),
    /// Contract error code from a `Result::Err`.
    Err(u32),
}

impl ScValue {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn address(account: &AccountId) -> Self {
        Self::Address(account.to_string())
    }

    pub fn commitment(commitment: &Commitment) -> Self {
        Self::Bytes(commitment.as_bytes().to_vec())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            Self::U32(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ScValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a struct field on a map value.
    pub fn field(&self, name: &str) -> Option<&ScValue> {
        self.as_map().and_then(|m| m.get(name))
    }

    /// Split a contract return into its success payload or error code.
    ///
    /// `Ok(v)` unwraps to `v`; a bare value is treated as success. `Void`
    /// (also inside `Ok`) yields `None`.
    pub fn into_outcome(self) -> Result<Option<ScValue>, u32> {
        match self {
            Self::Err(code) => Err(code),
            Self::Ok(inner) => match *inner {
                Self::Void => Ok(None),
                other => Ok(Some(other)),
            },
            Self::Void => Ok(None),
            other => Ok(Some(other)),
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bytes_serialize_as_hex() {
        let v = ScValue::bytes(vec![0xab, 0x01]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({"type": "bytes", "value": "ab01"}));
        let back: ScValue = serde_json::from_value(json!({"type": "bytes", "value": "0xab01"})).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn void_has_no_content() {
        let v: ScValue = serde_json::from_value(json!({"type": "void"})).unwrap();
        assert!(v.is_void());
    }

    #[test]
    fn nested_map_fields_are_reachable() {
        let v: ScValue = serde_json::from_value(json!({
            "type": "map",
            "value": {
                "owner": {"type": "address", "value": "GOWNER"},
                "revoked": {"type": "bool", "value": false},
                "expires_at": {"type": "u64", "value": 1700000000u64}
            }
        }))
        .unwrap();
        assert_eq!(v.field("owner").and_then(ScValue::as_address), Some("GOWNER"));
        assert_eq!(v.field("revoked").and_then(ScValue::as_bool), Some(false));
        assert_eq!(v.field("expires_at").and_then(ScValue::as_u64), Some(1_700_000_000));
    }

    #[test]
    fn outcome_unwraps_result_envelope() {
        assert_eq!(ScValue::Err(5).into_outcome(), Err(5));
        assert_eq!(ScValue::Ok(Box::new(ScValue::Void)).into_outcome(), Ok(None));
        assert_eq!(
            ScValue::Ok(Box::new(ScValue::Bool(true))).into_outcome(),
            Ok(Some(ScValue::Bool(true)))
        );
        assert_eq!(ScValue::U32(3).into_outcome(), Ok(Some(ScValue::U32(3))));
    }
}
