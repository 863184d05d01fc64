//! Registration Secret Derivation
//!
//! Produces the 32-byte secret that binds the commit and reveal phases
//! together. The bulk of the secret is random; the first eight bytes can
//! optionally carry a platform-domain fingerprint and a campaign reference
//! so attribution survives in the on-chain commitment.

use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte registration secret.
///
/// Layout when both optional inputs are supplied:
/// bytes [0,4) = first 4 bytes of the platform-domain fingerprint,
/// bytes [4,8) = campaign reference as big-endian u32,
/// bytes [8,32) = cryptographically random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret([u8; 32]);

impl Secret {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Transmission encoding: lowercase hex prefixed with `0x`.
    pub fn to_hex(&self) -> String {
        let hex: String = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        format!("0x{}", hex)
    }
}

/// Deterministic fingerprint of a platform domain string.
///
/// The value is never verified on-chain, so the algorithm only has to be
/// stable across calls for the same input.
pub fn domain_fingerprint(domain: &str) -> [u8; 32] {
    let digest = Sha256::digest(domain.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Derive a fresh registration secret.
///
/// Starts from 32 random bytes, then overwrites bytes [0,4) with the
/// platform-domain fingerprint and bytes [4,8) with the big-endian campaign
/// reference when those inputs are present.
pub fn derive_secret(
    platform_domain: Option<&str>,
    campaign: Option<u64>,
) -> Result<Secret, FlowError> {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);

    if let Some(domain) = platform_domain {
        let fingerprint = domain_fingerprint(domain);
        bytes[..4].copy_from_slice(&fingerprint[..4]);
    }

    if let Some(campaign) = campaign {
        if campaign > u32::MAX as u64 {
            return Err(FlowError::CampaignTooLarge(campaign));
        }
        bytes[4..8].copy_from_slice(&(campaign as u32).to_be_bytes());
    }

    Ok(Secret(bytes))
}
