//! # Proof and Signal Encoding — Verifier Byte Layouts
//!
//! Flattens a Groth16 proof and its public signals into the contiguous byte
//! strings the on-chain verifier accepts.
//!
//! ## Proof Layout
//!
//! Components are concatenated in the order `pi_a`, `pi_c`, `pi_b` (each
//! `pi_b` pair in sequence), every coordinate as one 32-byte element.
//! Projective coordinates are encoded as given. The result is zero-padded
//! on the right to [`MIN_PROOF_LEN`] bytes; an affine proof (2 + 2 + 4
//! coordinates) fills exactly 256 bytes.
//!
//! ## Signal Layout
//!
//! Each signal becomes one 32-byte element in input order, so an `n`-signal
//! list always encodes to exactly `32 * n` bytes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EncodingError;
use crate::field::{FieldCodec, FieldInput, FIELD_BYTES};

/// Minimum proof length the verifier contract accepts.
pub const MIN_PROOF_LEN: usize = 256;

/// A Groth16 proof as produced by a prover toolchain.
///
/// Extra keys (`protocol`, `curve`, ...) are ignored. Camel-case component
/// names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    #[serde(alias = "piA")]
    pub pi_a: Vec<FieldInput>,
    #[serde(alias = "piB")]
    pub pi_b: Vec<Vec<FieldInput>>,
    #[serde(alias = "piC")]
    pub pi_c: Vec<FieldInput>,
}

impl ProofArtifact {
    /// Parse a proof from loosely-typed JSON, naming the first bad component.
    pub fn from_json(value: &Value) -> Result<Self, EncodingError> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Err(EncodingError::NotAnObject(json_kind(other))),
        };

        let pi_a = scalar_list(component(obj, "pi_a", "piA")?, "pi_a")?;
        let pi_c = scalar_list(component(obj, "pi_c", "piC")?, "pi_c")?;
        let pi_b = match component(obj, "pi_b", "piB")? {
            Value::Array(rows) => rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    scalar_list(row, "pi_b").map_err(|e| EncodingError::Component {
                        component: "pi_b",
                        index: i,
                        source: Box::new(e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(EncodingError::MalformedComponent {
                    component: "pi_b",
                    reason: format!("expected an array of pairs, got {}", json_kind(other)),
                })
            }
        };

        Ok(Self { pi_a, pi_b, pi_c })
    }

    /// Number of coordinates across all components.
    pub fn coordinate_count(&self) -> usize {
        self.pi_a.len() + self.pi_c.len() + self.pi_b.iter().map(Vec::len).sum::<usize>()
    }
}

pub(crate) fn component<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
    alias: &str,
) -> Result<&'a Value, EncodingError> {
    obj.get(name)
        .or_else(|| obj.get(alias))
        .ok_or(EncodingError::MissingComponent(name))
}

pub(crate) fn scalar_list(value: &Value, name: &'static str) -> Result<Vec<FieldInput>, EncodingError> {
    let items = value
        .as_array()
        .ok_or_else(|| EncodingError::MalformedComponent {
            component: name,
            reason: format!("expected an array, got {}", json_kind(value)),
        })?;
    items
        .iter()
        .enumerate()
        .map(|(index, v)| {
            FieldInput::from_json(v).map_err(|e| EncodingError::Component {
                component: name,
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Encoded forms ──────────────────────────────────────────────────

/// Proof bytes in verifier layout. At least [`MIN_PROOF_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedProof(Vec<u8>);

impl EncodedProof {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Public signals in verifier layout, 32 bytes per signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedInputs(Vec<u8>);

impl EncodedInputs {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn signal_count(&self) -> usize {
        self.0.len() / FIELD_BYTES
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Flatten a proof into verifier layout.
pub fn encode_proof(proof: &ProofArtifact, codec: &FieldCodec) -> Result<EncodedProof, EncodingError> {
    let mut out = Vec::with_capacity(proof.coordinate_count().max(8) * FIELD_BYTES);

    let mut push_all = |items: &[FieldInput], name: &'static str| -> Result<(), EncodingError> {
        for (index, item) in items.iter().enumerate() {
            let el = codec.encode(item).map_err(|e| EncodingError::Component {
                component: name,
                index,
                source: Box::new(e),
            })?;
            out.extend_from_slice(el.as_bytes());
        }
        Ok(())
    };

    push_all(&proof.pi_a, "pi_a")?;
    push_all(&proof.pi_c, "pi_c")?;
    for pair in &proof.pi_b {
        push_all(pair, "pi_b")?;
    }

    if out.len() < MIN_PROOF_LEN {
        out.resize(MIN_PROOF_LEN, 0);
    }
    Ok(EncodedProof(out))
}

/// [`encode_proof`] over untyped JSON input.
pub fn encode_proof_json(proof: &Value, codec: &FieldCodec) -> Result<EncodedProof, EncodingError> {
    encode_proof(&ProofArtifact::from_json(proof)?, codec)
}

/// Concatenate public signals in order.
pub fn encode_signals(signals: &[FieldInput], codec: &FieldCodec) -> Result<EncodedInputs, EncodingError> {
    let mut out = Vec::with_capacity(signals.len() * FIELD_BYTES);
    for (index, signal) in signals.iter().enumerate() {
        let el = codec.encode(signal).map_err(|e| EncodingError::Signal {
            index,
            source: Box::new(e),
        })?;
        out.extend_from_slice(el.as_bytes());
    }
    Ok(EncodedInputs(out))
}

/// Parse a JSON list of signals. Anything other than an array is rejected.
pub fn signals_from_json(value: &Value) -> Result<Vec<FieldInput>, EncodingError> {
    let items = value
        .as_array()
        .ok_or_else(|| EncodingError::NotAList(json_kind(value)))?;
    items
        .iter()
        .enumerate()
        .map(|(index, v)| {
            FieldInput::from_json(v).map_err(|e| EncodingError::Signal {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

/// [`encode_signals`] over untyped JSON input.
pub fn encode_signals_json(signals: &Value, codec: &FieldCodec) -> Result<EncodedInputs, EncodingError> {
    encode_signals(&signals_from_json(signals)?, codec)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn signal_bytes_are_32_per_signal(values in proptest::collection::vec(any::<u64>(), 0..24)) {
            let signals: Vec<FieldInput> = values.iter().copied().map(FieldInput::from).collect();
            let encoded = encode_signals(&signals, &FieldCodec::default()).unwrap();
            prop_assert_eq!(encoded.len(), 32 * values.len());
        }

        #[test]
        fn proof_length_is_max_of_256_and_coordinates(
            a in proptest::collection::vec(any::<u64>(), 0..4),
            c in proptest::collection::vec(any::<u64>(), 0..4),
            b in proptest::collection::vec(proptest::collection::vec(any::<u64>(), 2), 0..4),
        ) {
            let proof = ProofArtifact {
                pi_a: a.into_iter().map(FieldInput::from).collect(),
                pi_b: b.into_iter().map(|p| p.into_iter().map(FieldInput::from).collect()).collect(),
                pi_c: c.into_iter().map(FieldInput::from).collect(),
            };
            let expected = (proof.coordinate_count() * 32).max(MIN_PROOF_LEN);
            let encoded = encode_proof(&proof, &FieldCodec::default()).unwrap();
            prop_assert_eq!(encoded.len(), expected);
        }
    }
}
