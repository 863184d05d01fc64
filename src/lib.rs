//! Commit-Reveal Name Registration Client
//!
//! Client-side logic for an ENS-style name registrar with a price oracle
//! and a payment-splitting treasury: secret derivation, price computation,
//! commitment planning, and the two-phase commit/register flow. The chain
//! itself is reached through the [`gateway::ChainGateway`] trait.

pub mod artifact;
pub mod config;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod protocol;

pub use config::FlowConfig;
pub use error::FlowError;
pub use flow::{FlowState, RegistrationFlow};
pub use gateway::{ChainGateway, CommitReceipt, RegisterReceipt, SimulatedRegistrar};
pub use protocol::{
    build_commitment_request, compute_prices, derive_secret, Address, ComputedPrices, PriceQuote,
    RegistrationRequest, Secret,
};
