//! Chain Gateway
//!
//! The seam between the protocol core and whatever actually talks to the
//! chain. The core only ever sees this trait; signing, RPC transport and
//! receipt polling live behind it.

pub mod nonce;
pub mod revert;
pub mod simulated;

pub use nonce::NonceAllocator;
pub use revert::{decode_revert, encode_revert, error_selector};
pub use simulated::SimulatedRegistrar;

use crate::error::FlowError;
use crate::protocol::{PriceQuote, RegistrationRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receipt for a confirmed commit transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Commitment id as reported by the registrar (hex hash).
    pub commitment_id: String,
    /// Confirmation time; the flow measures the reveal window from this.
    pub confirmed_at: DateTime<Utc>,
}

/// Receipt for a confirmed register transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterReceipt {
    pub tx_id: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Minimal contract every chain backend must satisfy.
///
/// Implementations must tolerate concurrent independent calls and bound
/// their confirmation waits, surfacing [`FlowError::ConfirmationTimeout`]
/// rather than blocking forever. Contract reverts are decoded through
/// [`decode_revert`]; transport failures become
/// [`FlowError::TransportError`].
pub trait ChainGateway {
    /// Current rent quote from the price oracle.
    fn get_price_quote(&self, name: &str, duration: u64) -> Result<PriceQuote, FlowError>;

    /// Submit the commit transaction and wait for confirmation.
    fn submit_commitment(&self, request: &RegistrationRequest)
        -> Result<CommitReceipt, FlowError>;

    /// Submit the register transaction carrying `value` wei.
    fn submit_registration(
        &self,
        request: &RegistrationRequest,
        value: u128,
    ) -> Result<RegisterReceipt, FlowError>;
}
