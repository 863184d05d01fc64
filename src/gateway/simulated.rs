//! Simulated Registrar
//!
//! In-process stand-in for the deployed registrar contract, used by the
//! demo CLI and the tests. It reproduces the contract's observable
//! behavior: commitment storage with min/max age enforcement, availability
//! tracking, payment checks against a freshly computed quote, and revert
//! payloads encoded with the real selectors so the decode path is exercised
//! end to end.

use crate::error::FlowError;
use crate::gateway::nonce::NonceAllocator;
use crate::gateway::revert::{decode_revert, encode_revert};
use crate::gateway::{ChainGateway, CommitReceipt, RegisterReceipt};
use crate::protocol::pricing::compute_prices;
use crate::protocol::{Address, PriceQuote, RegistrationRequest};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Labels shorter than this pay the short-name premium.
const SHORT_NAME_THRESHOLD: usize = 5;

/// One transaction accepted by the simulated registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTx {
    pub account: Address,
    pub nonce: u64,
    pub operation: String,
}

#[derive(Debug, Clone)]
struct CommitmentRecord {
    committed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistrarState {
    /// commitment id (hex) -> stored commitment
    commitments: HashMap<String, CommitmentRecord>,
    /// name -> expiry
    registrations: HashMap<String, DateTime<Utc>>,
    /// Simulated clock offset, advanced by tests instead of sleeping.
    clock_offset_secs: i64,
    tx_log: Vec<SubmittedTx>,
    tx_counter: u64,
}

/// In-memory registrar implementing [`ChainGateway`].
pub struct SimulatedRegistrar {
    buyer: Address,
    rent_per_second: u128,
    short_name_premium: u128,
    min_commitment_age: Duration,
    max_commitment_age: Duration,
    nonces: Arc<NonceAllocator>,
    state: Mutex<RegistrarState>,
}

impl SimulatedRegistrar {
    /// Create a registrar with the default rent schedule
    /// (1 gwei per second, 0.01 ether premium for short labels).
    pub fn new(buyer: Address, min_commitment_age: Duration, max_commitment_age: Duration) -> Self {
        Self {
            buyer,
            rent_per_second: 1_000_000_000,
            short_name_premium: 10_000_000_000_000_000,
            min_commitment_age,
            max_commitment_age,
            nonces: Arc::new(NonceAllocator::new()),
            state: Mutex::new(RegistrarState::default()),
        }
    }

    /// Override the rent schedule.
    pub fn with_rent(mut self, rent_per_second: u128, short_name_premium: u128) -> Self {
        self.rent_per_second = rent_per_second;
        self.short_name_premium = short_name_premium;
        self
    }

    /// Advance the simulated clock. Lets tests cross the commitment age
    /// window without sleeping.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().expect("registrar state poisoned");
        state.clock_offset_secs += by.as_secs() as i64;
    }

    /// Transactions accepted so far, in submission order.
    pub fn tx_log(&self) -> Vec<SubmittedTx> {
        self.state
            .lock()
            .expect("registrar state poisoned")
            .tx_log
            .clone()
    }

    /// True while `name` has an unexpired registration.
    pub fn is_registered(&self, name: &str) -> bool {
        let state = self.state.lock().expect("registrar state poisoned");
        let now = Utc::now() + ChronoDuration::seconds(state.clock_offset_secs);
        state
            .registrations
            .get(name)
            .map(|expiry| *expiry > now)
            .unwrap_or(false)
    }

    /// The registrar is the hash authority: commitment id is the SHA-256 of
    /// the request's canonical encoding.
    pub fn commitment_id(request: &RegistrationRequest) -> String {
        let digest = Sha256::digest(request.encode());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("0x{}", hex)
    }

    fn now(state: &RegistrarState) -> DateTime<Utc> {
        Utc::now() + ChronoDuration::seconds(state.clock_offset_secs)
    }

    fn revert(name: &str) -> FlowError {
        decode_revert(&encode_revert(name))
    }

    fn record_tx(&self, state: &mut RegistrarState, operation: &str) -> u64 {
        let nonce = self.nonces.next(&self.buyer);
        state.tx_counter += 1;
        state.tx_log.push(SubmittedTx {
            account: self.buyer.clone(),
            nonce,
            operation: operation.to_string(),
        });
        nonce
    }

    fn quote_for(&self, name: &str, duration: u64) -> PriceQuote {
        let base = self.rent_per_second * duration as u128;
        let label = name.split('.').next().unwrap_or(name);
        let premium = if label.len() < SHORT_NAME_THRESHOLD {
            self.short_name_premium
        } else {
            0
        };
        PriceQuote::new(base, premium)
    }
}

impl ChainGateway for SimulatedRegistrar {
    fn get_price_quote(&self, name: &str, duration: u64) -> Result<PriceQuote, FlowError> {
        let quote = self.quote_for(name, duration);
        debug!(
            "rent quote for {:?}/{}s: base={} premium={}",
            name, duration, quote.base, quote.premium
        );
        Ok(quote)
    }

    fn submit_commitment(
        &self,
        request: &RegistrationRequest,
    ) -> Result<CommitReceipt, FlowError> {
        let mut state = self.state.lock().expect("registrar state poisoned");
        let nonce = self.record_tx(&mut state, "commit");
        let now = Self::now(&state);

        let id = Self::commitment_id(request);
        if let Some(existing) = state.commitments.get(&id) {
            let age = now - existing.committed_at;
            if age.to_std().unwrap_or_default() <= self.max_commitment_age {
                return Err(Self::revert("UnexpiredCommitmentExists"));
            }
        }

        state.commitments.insert(
            id.clone(),
            CommitmentRecord { committed_at: now },
        );

        info!(
            "commitment stored: id={} nonce={} name={:?}",
            &id[..10],
            nonce,
            request.name
        );

        Ok(CommitReceipt {
            commitment_id: id,
            confirmed_at: now,
        })
    }

    fn submit_registration(
        &self,
        request: &RegistrationRequest,
        value: u128,
    ) -> Result<RegisterReceipt, FlowError> {
        let mut state = self.state.lock().expect("registrar state poisoned");
        let nonce = self.record_tx(&mut state, "register");
        let now = Self::now(&state);

        // Missing commitments look like age zero, exactly as a zeroed
        // timestamp slot does on-chain.
        let id = Self::commitment_id(request);
        let committed_at = match state.commitments.get(&id) {
            Some(record) => record.committed_at,
            None => return Err(Self::revert("CommitmentTooNew")),
        };

        let age = (now - committed_at).to_std().unwrap_or_default();
        if age < self.min_commitment_age {
            return Err(Self::revert("CommitmentTooNew"));
        }
        if age > self.max_commitment_age {
            return Err(Self::revert("CommitmentTooOld"));
        }

        if request.resolver.is_zero() && !request.extra_data.is_empty() {
            return Err(Self::revert("ResolverRequiredWhenDataSupplied"));
        }

        if let Some(expiry) = state.registrations.get(&request.name) {
            if *expiry > now {
                return Err(Self::revert("NameNotAvailable"));
            }
        }

        // The contract recomputes the payment from the live quote; a value
        // based on a stale quote is rejected.
        let prices = compute_prices(&self.quote_for(&request.name, request.duration));
        if value < prices.payment_value {
            return Err(Self::revert("InsufficientValue"));
        }

        state.commitments.remove(&id);
        state.registrations.insert(
            request.name.clone(),
            now + ChronoDuration::seconds(request.duration as i64),
        );

        let tx_id = format!("register_{}", state.tx_counter);
        info!(
            "registered {:?} for {}s: tx={} nonce={} value={}",
            request.name, request.duration, tx_id, nonce, value
        );

        Ok(RegisterReceipt {
            tx_id,
            confirmed_at: now,
        })
    }
}
