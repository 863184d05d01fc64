//! Flow configuration
//!
//! Named account roles replace the positional `accounts[0]`/`accounts[1]`
//! convention of the original deployment scripts: the owner operates the
//! treasury, the buyer pays for and receives registrations.

use crate::protocol::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Deployed registrar/payments contract
    pub registrar_address: Address,

    /// Treasury owner account
    pub owner_account: Address,

    /// Account paying for and receiving registrations
    pub buyer_account: Address,

    /// Default resolver for registered names
    pub resolver: Address,

    /// Gas limit applied to submitted transactions
    pub default_gas: u64,

    /// Minimum commitment age before a reveal is accepted, in seconds
    pub min_commitment_age_secs: u64,

    /// Maximum commitment age before the commitment expires, in seconds
    pub max_commitment_age_secs: u64,

    /// Path to the ignition deployment artifact (contract ABI document)
    pub artifact_path: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            registrar_address: Address::from_str("0xaf981B8FB5429d1D64B16F98A2BDfc6cF667A08D")
                .unwrap(),
            owner_account: Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
                .unwrap(),
            buyer_account: Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
                .unwrap(),
            resolver: Address::from_str("0xa48a285BAb4061e9104EeA29f968b1B801423E32").unwrap(),
            default_gas: 2_000_000,
            min_commitment_age_secs: 60,
            max_commitment_age_secs: 86_400,
            artifact_path:
                "ignition/deployments/chain-31337/artifacts/AtlantaPayments#AtlantaPayments.json"
                    .to_string(),
        }
    }
}

impl FlowConfig {
    /// Config for a local hardhat node.
    pub fn localnet() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            ..Default::default()
        }
    }
}
