//! # zkid-core — Foundational Types for the zkid Stack
//!
//! Pure, synchronous building blocks shared by every other crate: the
//! field-element codec, the verifier byte layouts for proofs and public
//! signals, the verification-key payload, the contract value model, and
//! validated ledger identifiers.
//!
//! ## Key Design Principles
//!
//! 1. **Strict by default.** `FieldCodec::default()` rejects overflowing
//!    values and non-numeric strings. Lenient mappings must be opted into
//!    through `FieldPolicy`.
//!
//! 2. **Newtypes for ledger identifiers.** `AccountId`, `ContractId`,
//!    `Commitment` and `CredentialId` validate on construction.
//!
//! 3. **`CanonicalBytes` for digests.** Proof hashing flows through JCS
//!    canonicalization so key order never changes a digest.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkid-*` crates.
//! - No I/O, no async.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod encoding;
pub mod error;
pub mod field;
pub mod identity;
pub mod value;
pub mod vk;

pub use canonical::{hash_proof, sha256_hex, CanonicalBytes};
pub use encoding::{
    encode_proof, encode_proof_json, encode_signals, encode_signals_json, signals_from_json,
    EncodedInputs, EncodedProof, ProofArtifact, MIN_PROOF_LEN,
};
pub use error::{CanonicalizationError, EncodingError, IdentityError};
pub use field::{
    FieldCodec, FieldElement, FieldInput, FieldPolicy, OverflowPolicy, StringPolicy, FIELD_BYTES,
};
pub use identity::{AccountId, Commitment, ContractId, CredentialId, COMMITMENT_LEN, STRKEY_LEN};
pub use value::ScValue;
pub use vk::VerificationKey;
