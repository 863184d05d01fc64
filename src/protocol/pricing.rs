//! Price Calculation
//!
//! Computes register/payment/fee amounts from the oracle's rent quote,
//! matching the integer-truncation semantics the contract recomputes
//! on-chain. Multiply before dividing; order of operations matters for
//! bit-for-bit parity.

use serde::{Deserialize, Serialize};

/// Registration value as a percentage of the rent price.
pub const REGISTER_PERCENT: u32 = 110;
/// Payment value as a percentage of the rent price.
/// Must stay >= [`REGISTER_PERCENT`] so the fee can never go negative.
pub const PAYMENT_PERCENT: u32 = 115;

/// Rent price snapshot from the price oracle, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub base: u128,
    pub premium: u128,
}

impl PriceQuote {
    pub fn new(base: u128, premium: u128) -> Self {
        Self { base, premium }
    }

    /// Combined rent price. Saturates at `u128::MAX` so a hostile oracle
    /// quote cannot panic the client.
    pub fn total(&self) -> u128 {
        self.base.saturating_add(self.premium)
    }
}

/// Amounts derived from a quote: what the registrar keeps, what the buyer
/// pays, and the treasury fee in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedPrices {
    pub register_value: u128,
    pub payment_value: u128,
    pub fee_value: u128,
}

/// Apply a markup percentage to a quote with truncating integer division.
/// Multiplication saturates; any real quote is far below the saturation
/// point, so truncation parity with the contract is unaffected.
pub fn calculate_price(quote: &PriceQuote, percent: u32) -> u128 {
    quote.total().saturating_mul(percent as u128) / 100
}

/// Compute all three amounts from a single quote.
pub fn compute_prices(quote: &PriceQuote) -> ComputedPrices {
    let register_value = calculate_price(quote, REGISTER_PERCENT);
    let payment_value = calculate_price(quote, PAYMENT_PERCENT);

    ComputedPrices {
        register_value,
        payment_value,
        fee_value: payment_value - register_value,
    }
}
