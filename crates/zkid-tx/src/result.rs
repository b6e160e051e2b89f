//! Contract return-value extraction and error-code tables.

use serde::{Deserialize, Serialize};
use zkid_core::ScValue;

use crate::error::TxError;

/// The native return value of a contract method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodResult {
    Value(ScValue),
    Void,
}

impl MethodResult {
    pub fn value(&self) -> Option<&ScValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Void => None,
        }
    }

    pub fn into_value(self) -> Option<ScValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Void => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }
}

/// Maps a contract's numeric error codes to symbolic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractErrorTable {
    contract: &'static str,
    names: &'static [(u32, &'static str)],
}

impl ContractErrorTable {
    pub const fn new(contract: &'static str, names: &'static [(u32, &'static str)]) -> Self {
        Self { contract, names }
    }

    pub fn contract(&self) -> &'static str {
        self.contract
    }

    pub fn name(&self, code: u32) -> &'static str {
        self.names
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    pub fn error(&self, code: u32) -> TxError {
        TxError::Contract {
            contract: self.contract,
            code,
            name: self.name(code),
        }
    }
}

/// Turn a raw return value into a [`MethodResult`], surfacing `Err(code)`
/// as a named contract error.
pub fn extract_result(
    value: Option<ScValue>,
    table: &ContractErrorTable,
) -> Result<MethodResult, TxError> {
    match value.map(ScValue::into_outcome) {
        None | Some(Ok(None)) => Ok(MethodResult::Void),
        Some(Ok(Some(v))) => Ok(MethodResult::Value(v)),
        Some(Err(code)) => Err(table.error(code)),
    }
}

/// Find a contract error code in host diagnostic text, e.g. `Error(Contract, #5)`.
pub fn parse_contract_error_code(message: &str) -> Option<u32> {
    const MARKER: &str = "Error(Contract, #";
    let start = message.find(MARKER)? + MARKER.len();
    let digits: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: ContractErrorTable =
        ContractErrorTable::new("verifier", &[(2, "EmptyProof"), (5, "NotVerified")]);

    #[test]
    fn err_code_maps_to_symbolic_name() {
        let err = extract_result(Some(ScValue::Err(5)), &TABLE).unwrap_err();
        assert_eq!(err.contract_error_name(), Some("NotVerified"));
        assert_eq!(err.to_string(), "verifier contract error #5 (NotVerified)");
    }

    #[test]
    fn unknown_code_is_named_unknown() {
        assert_eq!(TABLE.name(99), "Unknown");
    }

    #[test]
    fn void_and_missing_are_void() {
        assert_eq!(extract_result(None, &TABLE).unwrap(), MethodResult::Void);
        assert_eq!(extract_result(Some(ScValue::Void), &TABLE).unwrap(), MethodResult::Void);
    }

    #[test]
    fn ok_wrapper_is_unwrapped() {
        let v = extract_result(Some(ScValue::Ok(Box::new(ScValue::Bool(true)))), &TABLE).unwrap();
        assert_eq!(v, MethodResult::Value(ScValue::Bool(true)));
    }

    #[test]
    fn parses_host_error_text() {
        let msg = "HostError: Error(Contract, #5)\nEvent log: ...";
        assert_eq!(parse_contract_error_code(msg), Some(5));
        assert_eq!(parse_contract_error_code("Error(Budget, ExceededLimit)"), None);
        assert_eq!(parse_contract_error_code("Error(Contract, #)"), None);
    }
}
