//! # Verification Keys — Verifier Admin Payload
//!
//! Parses a Groth16 `verification_key.json` and renders it as the
//! structured contract value the verifier stores:
//!
//! ```text
//! { alpha: [bytes; 3], beta: [[bytes; 2]; 3], gamma: ..., delta: ..., ic: [[bytes; 3]; n] }
//! ```
//!
//! Every coordinate goes through the same [`FieldCodec`] as proofs, so
//! the key and the proofs checked against it share one encoding policy.
//! A G1 point given in affine form (two coordinates) gets `1` appended as
//! its projective `z`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::encoding::{component, json_kind, scalar_list};
use crate::error::EncodingError;
use crate::field::{FieldCodec, FieldInput};
use crate::value::ScValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    pub alpha: Vec<FieldInput>,
    pub beta: Vec<Vec<FieldInput>>,
    pub gamma: Vec<Vec<FieldInput>>,
    pub delta: Vec<Vec<FieldInput>>,
    pub ic: Vec<Vec<FieldInput>>,
}

impl VerificationKey {
    /// Parse prover-toolchain output (`vk_alpha_1`, `vk_beta_2`,
    /// `vk_gamma_2`, `vk_delta_2`, `IC`). Short names are accepted too.
    pub fn from_json(value: &Value) -> Result<Self, EncodingError> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Err(EncodingError::NotAnObject(json_kind(other))),
        };

        let alpha = g1(scalar_list(component(obj, "vk_alpha_1", "alpha")?, "vk_alpha_1")?);
        let beta = pairs(component(obj, "vk_beta_2", "beta")?, "vk_beta_2")?;
        let gamma = pairs(component(obj, "vk_gamma_2", "gamma")?, "vk_gamma_2")?;
        let delta = pairs(component(obj, "vk_delta_2", "delta")?, "vk_delta_2")?;
        let ic = pairs(component(obj, "IC", "ic")?, "IC")?.into_iter().map(g1).collect::<Vec<_>>();
        if ic.is_empty() {
            return Err(EncodingError::MalformedComponent {
                component: "IC",
                reason: "needs at least one point".into(),
            });
        }

        Ok(Self {
            alpha,
            beta,
            gamma,
            delta,
            ic,
        })
    }

    /// Number of public signals the key accepts.
    pub fn public_inputs(&self) -> usize {
        self.ic.len() - 1
    }

    /// The structured value `set_verification_key` takes.
    pub fn to_sc_value(&self, codec: &FieldCodec) -> Result<ScValue, EncodingError> {
        let mut map = BTreeMap::new();
        map.insert("alpha".to_string(), point(&self.alpha, codec, "alpha")?);
        map.insert("beta".to_string(), points(&self.beta, codec, "beta")?);
        map.insert("gamma".to_string(), points(&self.gamma, codec, "gamma")?);
        map.insert("delta".to_string(), points(&self.delta, codec, "delta")?);
        map.insert("ic".to_string(), points(&self.ic, codec, "ic")?);
        Ok(ScValue::Map(map))
    }
}

fn g1(mut coords: Vec<FieldInput>) -> Vec<FieldInput> {
    if coords.len() == 2 {
        coords.push(FieldInput::from(1u64));
    }
    coords
}

fn pairs(value: &Value, name: &'static str) -> Result<Vec<Vec<FieldInput>>, EncodingError> {
    let rows = value.as_array().ok_or_else(|| EncodingError::MalformedComponent {
        component: name,
        reason: format!("expected an array of points, got {}", json_kind(value)),
    })?;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            scalar_list(row, name).map_err(|e| EncodingError::Component {
                component: name,
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

fn point(coords: &[FieldInput], codec: &FieldCodec, name: &'static str) -> Result<ScValue, EncodingError> {
    coords
        .iter()
        .enumerate()
        .map(|(index, c)| {
            codec
                .encode(c)
                .map(|el| ScValue::bytes(el.as_bytes().to_vec()))
                .map_err(|e| EncodingError::Component {
                    component: name,
                    index,
                    source: Box::new(e),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ScValue::Vec)
}

fn points(rows: &[Vec<FieldInput>], codec: &FieldCodec, name: &'static str) -> Result<ScValue, EncodingError> {
    rows.iter()
        .map(|row| point(row, codec, name))
        .collect::<Result<Vec<_>, _>>()
        .map(ScValue::Vec)
}
