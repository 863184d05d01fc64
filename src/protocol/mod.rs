//! Core commit-reveal protocol building blocks

pub mod commitment;
pub mod pricing;
pub mod secret;

pub use commitment::{build_commitment_request, Address, RegistrationRequest};
pub use pricing::{calculate_price, compute_prices, ComputedPrices, PriceQuote};
pub use secret::{derive_secret, domain_fingerprint, Secret};
