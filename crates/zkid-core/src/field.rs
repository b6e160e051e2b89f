//! # Field Element Codec — 32-Byte Big-Endian Scalars
//!
//! Converts heterogeneous scalar inputs (integers, `0x`-hex strings, decimal
//! strings) into the fixed 32-byte big-endian form the verifier contract
//! consumes for every Groth16 coordinate and public signal.
//!
//! ## Invariants
//!
//! - Output is always exactly 32 bytes, left-zero-padded.
//! - A numeric input `n < 2^256` decodes back to `n` exactly.
//! - Values wider than 256 bits are rejected unless the codec is built with
//!   [`OverflowPolicy::TruncateLeft`], which keeps the low 32 bytes.
//! - Non-numeric strings are rejected unless a [`StringPolicy`] mapping is
//!   selected explicitly. Neither mapping is a standard field embedding, so
//!   proofs encoded that way only verify against circuits built the same way.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::EncodingError;

/// Width of one encoded field element.
pub const FIELD_BYTES: usize = 32;

/// BN254 scalar field modulus `r`, big-endian.
const BN254_SCALAR_MODULUS: [u8; FIELD_BYTES] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// Multiplier of the legacy string accumulator.
const LEGACY_ACCUMULATOR_BASE: u32 = 131;

// ─── Policies ───────────────────────────────────────────────────────

/// What to do with numeric values wider than 256 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    Reject,
    /// Keep the least-significant 32 bytes.
    TruncateLeft,
}

/// How to treat strings that are neither hex nor decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPolicy {
    #[default]
    Reject,
    /// SHA-256 of the UTF-8 bytes, reduced modulo the BN254 scalar field.
    HashToField,
    /// `acc = (acc * 131 + byte) mod 2^256` over the UTF-8 bytes.
    LegacyAccumulator,
}

/// Combined codec policy. The default is strict on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    #[serde(default)]
    pub overflow: OverflowPolicy,
    #[serde(default)]
    pub strings: StringPolicy,
}

// ─── Inputs ─────────────────────────────────────────────────────────

/// A scalar accepted by the codec.
///
/// Deserializes from a JSON number or string; floats, negatives and other
/// JSON kinds are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldInput {
    Integer(BigUint),
    Text(String),
}

impl FieldInput {
    /// Interpret a JSON value as a field input.
    pub fn from_json(value: &Value) -> Result<Self, EncodingError> {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(Self::Integer(BigUint::from(u)))
                } else if let Some(i) = n.as_i64() {
                    Err(EncodingError::Negative(i.to_string()))
                } else {
                    Err(EncodingError::NonIntegral(n.to_string()))
                }
            }
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Null => Err(EncodingError::UnsupportedValue { kind: "null" }),
            Value::Bool(_) => Err(EncodingError::UnsupportedValue { kind: "boolean" }),
            Value::Array(_) => Err(EncodingError::UnsupportedValue { kind: "array" }),
            Value::Object(_) => Err(EncodingError::UnsupportedValue { kind: "object" }),
        }
    }
}

impl TryFrom<Value> for FieldInput {
    type Error = EncodingError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<FieldInput> for Value {
    fn from(input: FieldInput) -> Self {
        match input {
            FieldInput::Integer(n) => match u64::try_from(&n) {
                Ok(small) => Value::from(small),
                Err(_) => Value::String(n.to_str_radix(10)),
            },
            FieldInput::Text(s) => Value::String(s),
        }
    }
}

impl From<u64> for FieldInput {
    fn from(v: u64) -> Self {
        Self::Integer(BigUint::from(v))
    }
}

impl From<u128> for FieldInput {
    fn from(v: u128) -> Self {
        Self::Integer(BigUint::from(v))
    }
}

impl From<BigUint> for FieldInput {
    fn from(v: BigUint) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for FieldInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ─── Output ─────────────────────────────────────────────────────────

/// One encoded field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement([u8; FIELD_BYTES]);

impl FieldElement {
    pub fn as_bytes(&self) -> &[u8; FIELD_BYTES] {
        &self.0
    }

    /// Lowercase hex, 64 digits, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    fn from_biguint(n: &BigUint) -> Option<Self> {
        let bytes = n.to_bytes_be();
        if bytes.len() > FIELD_BYTES {
            return None;
        }
        let mut out = [0u8; FIELD_BYTES];
        out[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);
        Some(Self(out))
    }
}

impl From<[u8; FIELD_BYTES]> for FieldElement {
    fn from(bytes: [u8; FIELD_BYTES]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for FieldElement {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ─── Codec ──────────────────────────────────────────────────────────

/// Policy-driven scalar encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCodec {
    policy: FieldPolicy,
}

impl FieldCodec {
    pub fn new(policy: FieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    /// Encode a scalar into 32 big-endian bytes.
    ///
    /// # Errors
    ///
    /// [`EncodingError::Overflow`] for values above 256 bits under
    /// `OverflowPolicy::Reject`, [`EncodingError::NonNumericString`] for
    /// unparseable text under `StringPolicy::Reject`.
    pub fn encode(&self, input: &FieldInput) -> Result<FieldElement, EncodingError> {
        let n = match input {
            FieldInput::Integer(n) => n.clone(),
            FieldInput::Text(s) => self.parse_text(s)?,
        };
        self.fit(n)
    }

    /// Encode a raw JSON scalar.
    pub fn encode_json(&self, value: &Value) -> Result<FieldElement, EncodingError> {
        self.encode(&FieldInput::from_json(value)?)
    }

    /// Lowercase 64-digit hex of a 32-byte element.
    pub fn decode(bytes: &[u8; FIELD_BYTES]) -> String {
        hex::encode(bytes)
    }

    /// Like [`FieldCodec::decode`], with a `0x` prefix.
    pub fn decode_prefixed(bytes: &[u8; FIELD_BYTES]) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    pub fn decode_biguint(bytes: &[u8]) -> BigUint {
        BigUint::from_bytes_be(bytes)
    }

    fn parse_text(&self, s: &str) -> Result<BigUint, EncodingError> {
        if let Some(digits) = s.strip_prefix("0x") {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                if let Some(n) = BigUint::parse_bytes(digits.as_bytes(), 16) {
                    return Ok(n);
                }
            }
        } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Some(n) = BigUint::parse_bytes(s.as_bytes(), 10) {
                return Ok(n);
            }
        }

        match self.policy.strings {
            StringPolicy::Reject => Err(EncodingError::NonNumericString(s.to_string())),
            StringPolicy::HashToField => Ok(hash_to_field(s.as_bytes())),
            StringPolicy::LegacyAccumulator => Ok(legacy_accumulate(s.as_bytes())),
        }
    }

    fn fit(&self, n: BigUint) -> Result<FieldElement, EncodingError> {
        if let Some(element) = FieldElement::from_biguint(&n) {
            return Ok(element);
        }
        match self.policy.overflow {
            OverflowPolicy::Reject => {
                let hex_repr = n.to_str_radix(16);
                Err(EncodingError::Overflow {
                    hex_digits: hex_repr.len(),
                    value: format!("0x{hex_repr}"),
                })
            }
            OverflowPolicy::TruncateLeft => {
                let bytes = n.to_bytes_be();
                let mut out = [0u8; FIELD_BYTES];
                out.copy_from_slice(&bytes[bytes.len() - FIELD_BYTES..]);
                Ok(FieldElement(out))
            }
        }
    }
}

fn hash_to_field(bytes: &[u8]) -> BigUint {
    let digest = Sha256::digest(bytes);
    BigUint::from_bytes_be(&digest) % BigUint::from_bytes_be(&BN254_SCALAR_MODULUS)
}

fn legacy_accumulate(bytes: &[u8]) -> BigUint {
    let mask = (BigUint::from(1u32) << 256usize) - BigUint::from(1u32);
    bytes.iter().fold(BigUint::from(0u32), |acc, &b| {
        (acc * LEGACY_ACCUMULATOR_BASE + BigUint::from(b)) & &mask
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strict() -> FieldCodec {
        FieldCodec::default()
    }

    #[test]
    fn hex_string_is_left_padded() {
        let el = strict().encode(&"0x05".into()).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 5;
        assert_eq!(el.as_bytes(), &expected);
    }

    #[test]
    fn decimal_string_and_integer_agree() {
        let codec = strict();
        let a = codec.encode(&"255".into()).unwrap();
        let b = codec.encode(&255u64.into()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), format!("{:0>64}", "ff"));
    }

    #[test]
    fn zero_encodes_to_all_zero_bytes() {
        assert_eq!(strict().encode(&0u64.into()).unwrap().as_bytes(), &[0u8; 32]);
        assert_eq!(strict().encode(&"0x0".into()).unwrap().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn full_width_value_round_trips() {
        let max = format!("0x{}", "f".repeat(64));
        let el = strict().encode(&max.as_str().into()).unwrap();
        assert_eq!(el.as_bytes(), &[0xffu8; 32]);
    }

    #[test]
    fn overflow_rejected_by_default() {
        let wide = format!("0x1{}", "0".repeat(64));
        let err = strict().encode(&wide.as_str().into()).unwrap_err();
        match err {
            EncodingError::Overflow { hex_digits, .. } => assert_eq!(hex_digits, 65),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overflow_truncates_when_requested() {
        let codec = FieldCodec::new(FieldPolicy {
            overflow: OverflowPolicy::TruncateLeft,
            ..FieldPolicy::default()
        });
        let wide = format!("0xab{}", "0".repeat(63) + "7");
        let el = codec.encode(&wide.as_str().into()).unwrap();
        assert_eq!(el.to_hex(), format!("{}7", "0".repeat(63)));
    }

    #[test]
    fn uppercase_prefix_is_not_hex() {
        let err = strict().encode(&"0X10".into()).unwrap_err();
        assert!(matches!(err, EncodingError::NonNumericString(_)));
    }

    #[test]
    fn non_numeric_string_rejected_by_default() {
        let err = strict().encode(&"alice".into()).unwrap_err();
        assert!(matches!(err, EncodingError::NonNumericString(s) if s == "alice"));
        assert!(strict().encode(&"".into()).is_err());
        assert!(strict().encode(&"0x".into()).is_err());
    }

    #[test]
    fn hash_to_field_stays_below_modulus() {
        let codec = FieldCodec::new(FieldPolicy {
            strings: StringPolicy::HashToField,
            ..FieldPolicy::default()
        });
        let el = codec.encode(&"alice".into()).unwrap();
        assert!(el.to_biguint() < BigUint::from_bytes_be(&BN254_SCALAR_MODULUS));
        assert_eq!(el, codec.encode(&"alice".into()).unwrap());
        assert_ne!(el, codec.encode(&"bob".into()).unwrap());
    }

    #[test]
    fn legacy_accumulator_matches_hand_computation() {
        let codec = FieldCodec::new(FieldPolicy {
            strings: StringPolicy::LegacyAccumulator,
            ..FieldPolicy::default()
        });
        // "ab": (0*131 + 97)*131 + 98 = 12805
        let el = codec.encode(&"ab".into()).unwrap();
        assert_eq!(el.to_biguint(), BigUint::from(12_805u32));
    }

    #[test]
    fn json_scalars_are_classified() {
        let codec = strict();
        assert!(codec.encode_json(&json!(7)).is_ok());
        assert!(codec.encode_json(&json!("0x07")).is_ok());
        assert!(matches!(codec.encode_json(&json!(-1)), Err(EncodingError::Negative(_))));
        assert!(matches!(codec.encode_json(&json!(1.5)), Err(EncodingError::NonIntegral(_))));
        assert!(matches!(
            codec.encode_json(&json!(true)),
            Err(EncodingError::UnsupportedValue { kind: "boolean" })
        ));
    }

    #[test]
    fn decode_formats() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0x2a;
        assert_eq!(FieldCodec::decode(&bytes), format!("{:0>64}", "2a"));
        assert_eq!(FieldCodec::decode_prefixed(&bytes), format!("0x{:0>64}", "2a"));
        assert_eq!(FieldCodec::decode_biguint(&bytes), BigUint::from(42u32));
    }

    #[test]
    fn field_input_serde_uses_json_scalars() {
        let parsed: Vec<FieldInput> = serde_json::from_value(json!([1, "0x02", "3"])).unwrap();
        assert_eq!(parsed[0], FieldInput::from(1u64));
        assert_eq!(parsed[1], FieldInput::from("0x02"));
        assert!(serde_json::from_value::<FieldInput>(json!(null)).is_err());

        let big = FieldInput::from(u128::MAX);
        assert_eq!(
            serde_json::to_value(&big).unwrap(),
            json!(u128::MAX.to_string())
        );
    }
}
