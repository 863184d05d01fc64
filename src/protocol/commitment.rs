//! Commitment Planning
//!
//! Assembles and validates the registration request that both phases of the
//! commit-reveal protocol send to the registrar. The request's canonical
//! byte encoding must be identical on `makeCommitment`, `commit` and
//! `registerName`, or the stored commitment will not match at reveal time.
//! Hashing itself is delegated to the registrar, which is the single source
//! of truth for the commitment hash algorithm.

use crate::error::FlowError;
use crate::protocol::secret::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte Ethereum address, stored as lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The zero address, used for "no resolver".
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    /// Decode to the raw 20 bytes used in the canonical request encoding.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        for (i, chunk) in self.0[2..].as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char).to_digit(16).unwrap_or(0) as u8;
            let lo = (chunk[1] as char).to_digit(16).unwrap_or(0) as u8;
            out[i] = hi << 4 | lo;
        }
        out
    }
}

impl FromStr for Address {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| FlowError::InvalidAddress(s.to_string()))?;
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FlowError::InvalidAddress(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All parameters of a registration attempt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Normalized domain label, e.g. "billal.test".
    pub name: String,
    /// Account that will own the name after registration.
    pub owner: Address,
    /// Registration duration in seconds.
    pub duration: u64,
    /// Secret binding commit and reveal together.
    pub secret: Secret,
    /// Resolver address; [`Address::zero`] when none.
    pub resolver: Address,
    /// Extra resolver calldata, empty for a plain registration.
    pub extra_data: Vec<u8>,
    /// Whether to also set the reverse record.
    pub reverse_record: bool,
    /// Fuse bitmask, 0 by default.
    pub fuses: u32,
}

impl RegistrationRequest {
    /// Canonical byte encoding of the request.
    ///
    /// Sent verbatim on both the commit and register calls so the registrar
    /// hashes identical input in both phases. Variable-length fields are
    /// length-prefixed; integers are big-endian.
    pub fn encode(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let mut bytes = Vec::with_capacity(4 + name.len() + 20 + 8 + 32 + 20 + 4 + self.extra_data.len() + 1 + 4);

        bytes.extend_from_slice(&(name.len() as u32).to_be_bytes());
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&self.owner.to_bytes());
        bytes.extend_from_slice(&self.duration.to_be_bytes());
        bytes.extend_from_slice(self.secret.as_bytes());
        bytes.extend_from_slice(&self.resolver.to_bytes());
        bytes.extend_from_slice(&(self.extra_data.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.extra_data);
        bytes.push(self.reverse_record as u8);
        bytes.extend_from_slice(&self.fuses.to_be_bytes());

        bytes
    }
}

/// Conservative client-side screen; the contract remains the authority on
/// the exact charset.
fn valid_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.'
}

/// Validate inputs and assemble an immutable [`RegistrationRequest`].
#[allow(clippy::too_many_arguments)]
pub fn build_commitment_request(
    name: &str,
    owner: Address,
    duration: u64,
    secret: Secret,
    resolver: Address,
    extra_data: Vec<u8>,
    reverse_record: bool,
    fuses: u32,
) -> Result<RegistrationRequest, FlowError> {
    if name.is_empty() {
        return Err(FlowError::InvalidName("name is empty".to_string()));
    }
    if let Some(bad) = name.chars().find(|c| !valid_name_char(*c)) {
        return Err(FlowError::InvalidName(format!(
            "disallowed character {:?} in {:?}",
            bad, name
        )));
    }
    if duration == 0 {
        return Err(FlowError::InvalidDuration);
    }

    Ok(RegistrationRequest {
        name: name.to_string(),
        owner,
        duration,
        secret,
        resolver,
        extra_data,
        reverse_record,
        fuses,
    })
}
