//! # Error Rehumanization
//!
//! Rewrites raw host and endpoint diagnostics into messages an operator can
//! act on. Messages that match no known pattern pass through unchanged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const MISSING_SIGNERS_MARKER: &str = "requires signatures from ";
const NON_INVOKER_MARKER: &str = "needsNonInvokerSigningBy";

/// Rewrite a raw submission or simulation error.
///
/// A "requires signatures from ..." failure is rewritten to name the
/// missing signer addresses and explain that a co-signature is needed.
pub fn rehumanize(raw: &str) -> String {
    if let Some(signers) = missing_signers(raw) {
        return format!(
            "The transaction requires an additional signature from {}. The wallet was not \
             prompted for it because only the invoking account signs by default. Connect the \
             wallet that controls this address, or obtain a co-signature from the service \
             that operates it, then resubmit.",
            signers.join(", ")
        );
    }
    if raw.contains(NON_INVOKER_MARKER) {
        return "The transaction requires authorization from an account other than the one \
                submitting it. Obtain a co-signature from that account, then resubmit."
            .to_string();
    }
    raw.to_string()
}

/// Addresses named after "requires signatures from", in order.
pub fn missing_signers(raw: &str) -> Option<Vec<String>> {
    let start = raw.find(MISSING_SIGNERS_MARKER)? + MISSING_SIGNERS_MARKER.len();
    let signers: Vec<String> = raw[start..]
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map_while(address_token)
        .collect();
    (!signers.is_empty()).then_some(signers)
}

fn address_token(token: &str) -> Option<String> {
    let first = token.chars().next()?;
    if !matches!(first, 'G' | 'C') {
        return None;
    }
    let trimmed = token.trim_end_matches(|c| c == '.' || c == ';' || c == ')');
    let plausible = trimmed.len() >= 8
        && trimmed
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.');
    plausible.then(|| trimmed.to_string())
}

/// Human-readable diagnosis of an on-chain FAILED transaction.
pub fn diagnose_failure(result_meta: Option<&str>, result: Option<&str>) -> String {
    let text = [result_meta, result]
        .into_iter()
        .flatten()
        .map(searchable_text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.contains("outside of the footprint") {
        "a contract storage access fell outside of the transaction footprint; the transaction \
         must be re-simulated and prepared before signing"
            .to_string()
    } else if text.contains("put_contract_data") {
        "the contract failed to write its storage entry (put_contract_data); the footprint or \
         resource limits are likely insufficient"
            .to_string()
    } else {
        "transaction failed on-chain".to_string()
    }
}

/// Decode a base64 diagnostic only when it yields readable text.
///
/// Plain codes such as `txFAILED` are also valid base64; they are kept as
/// sent unless the decoded bytes are UTF-8 and printable.
pub(crate) fn decode_diagnostic_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match STANDARD.decode(trimmed) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) if is_printable(&text) => text,
            _ => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Raw text plus a lossy decoding, so host strings embedded in binary
/// result metadata can be matched.
fn searchable_text(raw: &str) -> String {
    match STANDARD.decode(raw.trim()) {
        Ok(bytes) => format!("{raw}\n{}", String::from_utf8_lossy(&bytes)),
        Err(_) => raw.to_string(),
    }
}

fn is_printable(text: &str) -> bool {
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .count();
    total > 0 && printable * 10 >= total * 9
}
