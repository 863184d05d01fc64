//! Per-Account Nonce Allocation
//!
//! The chain's nonce sequence is the one resource concurrent flows from the
//! same account share. A single allocator per process hands out nonces so
//! two flows can never submit colliding transactions.

use crate::protocol::Address;
use std::collections::HashMap;
use std::sync::Mutex;

/// Single-writer nonce allocator. Gateway implementations route every
/// submitted transaction through one shared instance.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    next: Mutex<HashMap<Address, u64>>,
}

impl NonceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account's next nonce, typically from the chain's current
    /// transaction count. Later seeds never move the counter backwards.
    pub fn seed(&self, account: &Address, next_nonce: u64) {
        let mut next = self.next.lock().expect("nonce allocator poisoned");
        let entry = next.entry(account.clone()).or_insert(next_nonce);
        if *entry < next_nonce {
            *entry = next_nonce;
        }
    }

    /// Allocate the next nonce for an account.
    pub fn next(&self, account: &Address) -> u64 {
        let mut next = self.next.lock().expect("nonce allocator poisoned");
        let entry = next.entry(account.clone()).or_insert(0);
        let nonce = *entry;
        *entry += 1;
        nonce
    }
}
