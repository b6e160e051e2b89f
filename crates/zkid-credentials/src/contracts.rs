//! Method names and error-code tables of the three credential contracts.
//!
//! Codes mirror the contracts' `#[repr(u32)]` error enums; a code missing
//! from a table is reported as `Unknown`.

use zkid_tx::ContractErrorTable;

// ─── Verifier ────────────────────────────────────────────────────────

pub mod verifier {
    pub const VERIFY_IDENTITY_PROOF: &str = "verify_identity_proof";
    pub const IS_COMMIT_VERIFIED: &str = "is_commit_verified";
    pub const GET_COMMIT_OWNER: &str = "get_commit_owner";
    pub const SET_VERIFICATION_KEY: &str = "set_verification_key";
    pub const GET_VERIFICATION_KEY: &str = "get_verification_key";
    pub const VERSION: &str = "version";
}

pub const VERIFIER_ERRORS: ContractErrorTable = ContractErrorTable::new(
    "verifier",
    &[
        (1, "VkNotSet"),
        (2, "EmptyProof"),
        (3, "EmptyInputs"),
        (4, "InvalidProofSize"),
        (5, "NotVerified"),
    ],
);

// ─── Credential registry ─────────────────────────────────────────────

pub mod registry {
    pub const ISSUE_CREDENTIAL: &str = "issue_credential";
    pub const REVOKE: &str = "revoke";
    pub const IS_VALID: &str = "is_valid";
    pub const GET_CREDENTIAL: &str = "get_credential";
    pub const VERSION: &str = "version";
}

pub const REGISTRY_ERRORS: ContractErrorTable = ContractErrorTable::new(
    "registry",
    &[
        (1, "NotFound"),
        (2, "AlreadyRevoked"),
        (3, "Expired"),
        (4, "Unauthorized"),
    ],
);

// ─── Compliance oracle ───────────────────────────────────────────────

pub mod compliance {
    pub const INIT: &str = "init";
    pub const GET_ADMIN: &str = "get_admin";
    pub const CHECK_SANCTIONS_LIST: &str = "check_sanctions_list";
    pub const SET_SANCTION_STATUS: &str = "set_sanction_status";
    pub const SET_EXPLANATION: &str = "set_explanation";
    pub const GET_EXPLANATION: &str = "get_explanation";
    pub const VERSION: &str = "version";
}

pub const COMPLIANCE_ERRORS: ContractErrorTable = ContractErrorTable::new(
    "compliance",
    &[(1, "AdminNotSet"), (2, "Unauthorized"), (3, "AdminAlreadySet")],
);
