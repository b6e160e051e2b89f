//! # Error Types — Encoding and Identifier Failures
//!
//! All errors raised by `zkid-core` are local and synchronous: they occur
//! before any network I/O and never leave a transaction half-built.
//!
//! ## Design
//!
//! - Encoding errors name the offending proof component or input index.
//! - Identifier errors carry the rejected value so callers can echo it.
//! - Canonicalization errors mirror the float-rejection rule used for
//!   proof hashing.

use thiserror::Error;

/// Failure converting proof material or public signals into ledger bytes.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The value encodes to more than 256 bits and the overflow policy is `Reject`.
    #[error("value {value} does not fit in a 32-byte field element ({hex_digits} hex digits)")]
    Overflow { value: String, hex_digits: usize },

    /// A string was neither `0x`-prefixed hex nor decimal and the string policy is `Reject`.
    #[error("value {0:?} is neither 0x-prefixed hex nor a decimal integer")]
    NonNumericString(String),

    /// Negative integers have no field-element representation here.
    #[error("negative value {0} cannot be encoded as a field element")]
    Negative(String),

    /// Non-integral JSON numbers are rejected.
    #[error("non-integral number {0} cannot be encoded as a field element")]
    NonIntegral(String),

    /// A JSON value of a kind that cannot become a field element.
    #[error("unsupported {kind} value where a field element was expected")]
    UnsupportedValue { kind: &'static str },

    /// The proof artifact was not a JSON object.
    #[error("proof artifact must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required proof component (`pi_a`, `pi_b`, `pi_c`) is absent.
    #[error("proof artifact is missing component {0}")]
    MissingComponent(&'static str),

    /// A proof component has the wrong shape.
    #[error("proof component {component} is malformed: {reason}")]
    MalformedComponent {
        component: &'static str,
        reason: String,
    },

    /// A field inside a proof component failed to encode.
    #[error("proof component {component}[{index}]: {source}")]
    Component {
        component: &'static str,
        index: usize,
        #[source]
        source: Box<EncodingError>,
    },

    /// Public signals were not supplied as a list.
    #[error("public signals must be a JSON array, got {0}")]
    NotAList(&'static str),

    /// A public signal failed to encode.
    #[error("public signal [{index}]: {source}")]
    Signal {
        index: usize,
        #[source]
        source: Box<EncodingError>,
    },

    /// A commitment or credential id had the wrong byte length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex text could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Canonical serialization for hashing failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical proof material: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A ledger identifier failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid account id {0:?}: expected 56 base32 characters starting with 'G'")]
    InvalidAccountId(String),

    #[error("invalid contract id {0:?}: expected 56 base32 characters starting with 'C'")]
    InvalidContractId(String),
}
