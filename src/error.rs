//! Error taxonomy for the registration flow
//!
//! Contract-level reverts, client-side validation failures and transport
//! problems all live in one enum so callers can match on a single type.
//! Reverts are decoded from raw payloads in [`crate::gateway::revert`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All the ways a registration attempt can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FlowError {
    // --- Contract reverts (decoded from revert payloads) ---
    /// The minimum commitment age has not elapsed on-chain.
    #[error("commitment is too new to reveal")]
    CommitmentTooNew,

    /// The commitment exceeded the maximum age and expired.
    #[error("commitment is too old and has expired")]
    CommitmentTooOld,

    /// The name is already registered and unexpired.
    #[error("name is not available")]
    NameNotAvailable,

    /// Extra resolver data was supplied without a resolver address.
    #[error("resolver is required when extra data is supplied")]
    ResolverRequiredWhenDataSupplied,

    /// A live commitment for the same parameters is already stored.
    #[error("an unexpired commitment already exists")]
    UnexpiredCommitmentExists,

    /// The submitted value does not cover the current payment price.
    #[error("insufficient value for registration")]
    InsufficientValue,

    /// The sending account is not allowed to perform the operation.
    #[error("unauthorised")]
    Unauthorised,

    #[error("max commitment age is too low")]
    MaxCommitmentAgeTooLow,

    #[error("max commitment age is too high")]
    MaxCommitmentAgeTooHigh,

    // --- Client-side validation (raised before any network call) ---
    /// Campaign references must fit in 32 unsigned bits.
    #[error("campaign reference {0} is too large")]
    CampaignTooLarge(u64),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("duration must be a positive number of seconds")]
    InvalidDuration,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The flow was asked to perform a transition its state does not allow.
    #[error("flow is not in the {expected} state")]
    InvalidFlowState { expected: String },

    /// Register was attempted outside the `[min_wait, max_wait]` window.
    /// Raised locally to avoid wasting a transaction the contract would revert.
    #[error(
        "register called outside the commitment window: {elapsed_secs}s elapsed, \
         window is {min_secs}s..{max_secs}s"
    )]
    CommitmentWindowViolated {
        elapsed_secs: u64,
        min_secs: u64,
        max_secs: u64,
    },

    // --- Transport ---
    /// Node/network failure, distinct from a contract revert.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The bounded confirmation wait elapsed without a receipt.
    #[error("timed out waiting for transaction confirmation")]
    ConfirmationTimeout,

    /// Catch-all for revert payloads with an unrecognized selector.
    #[error("unrecognized revert: {0}")]
    UnknownError(String),
}

impl FlowError {
    /// True for failures of the transport layer rather than the contract.
    /// Transport failures are safe to retry; reverts require re-planning.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FlowError::TransportError(_) | FlowError::ConfirmationTimeout
        )
    }

    /// True for errors decoded from a contract revert payload.
    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            FlowError::CommitmentTooNew
                | FlowError::CommitmentTooOld
                | FlowError::NameNotAvailable
                | FlowError::ResolverRequiredWhenDataSupplied
                | FlowError::UnexpiredCommitmentExists
                | FlowError::InsufficientValue
                | FlowError::Unauthorised
                | FlowError::MaxCommitmentAgeTooLow
                | FlowError::MaxCommitmentAgeTooHigh
                | FlowError::UnknownError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(FlowError::TransportError("connection refused".into()).is_transport());
        assert!(FlowError::ConfirmationTimeout.is_transport());
        assert!(!FlowError::InsufficientValue.is_transport());
        assert!(!FlowError::InvalidDuration.is_transport());
    }

    #[test]
    fn test_revert_classification() {
        assert!(FlowError::CommitmentTooNew.is_revert());
        assert!(FlowError::UnknownError("0xdeadbeef".into()).is_revert());
        assert!(!FlowError::CampaignTooLarge(u64::MAX).is_revert());
        assert!(!FlowError::TransportError("timeout".into()).is_revert());
    }
}
