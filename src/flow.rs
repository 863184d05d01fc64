//! Registration Flow State Machine
//!
//! Drives one registration attempt through the two-phase protocol:
//! commit, wait out the minimum commitment age, then register with payment.
//! The flow validates the reveal window locally before spending a
//! transaction the contract would revert, and re-fetches prices right
//! before registering because oracle values can drift after commit.

use crate::error::FlowError;
use crate::gateway::{ChainGateway, CommitReceipt, RegisterReceipt};
use crate::protocol::pricing::compute_prices;
use crate::protocol::RegistrationRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a registration attempt.
///
/// `Registered` and `Failed` are terminal. A failed attempt must not be
/// resumed: its commitment may already be stored on-chain, so retrying means
/// constructing a fresh flow with a new secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    Planned,
    Committed,
    AwaitingMaturity,
    Registered,
    Failed(FlowError),
}

/// One registration attempt: a request plus its reveal window.
#[derive(Debug)]
pub struct RegistrationFlow {
    request: RegistrationRequest,
    min_wait: Duration,
    max_wait: Duration,
    state: FlowState,
    committed_at: Option<DateTime<Utc>>,
    commitment_id: Option<String>,
}

impl RegistrationFlow {
    pub fn new(request: RegistrationRequest, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            request,
            min_wait,
            max_wait,
            state: FlowState::Planned,
            committed_at: None,
            commitment_id: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn request(&self) -> &RegistrationRequest {
        &self.request
    }

    /// Commitment id reported by the registrar, once committed.
    pub fn commitment_id(&self) -> Option<&str> {
        self.commitment_id.as_deref()
    }

    /// Minimum wait before the reveal may be sent.
    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    fn fail(&mut self, error: FlowError) -> FlowError {
        warn!("flow failed: {}", error);
        self.state = FlowState::Failed(error.clone());
        error
    }

    /// Phase 1: submit the commit transaction.
    ///
    /// On success the confirmation time becomes T0 for the reveal window and
    /// the flow moves straight to `AwaitingMaturity`.
    pub fn commit(&mut self, gateway: &impl ChainGateway) -> Result<CommitReceipt, FlowError> {
        if self.state != FlowState::Planned {
            return Err(FlowError::InvalidFlowState {
                expected: "Planned".to_string(),
            });
        }

        info!("committing registration for {:?}", self.request.name);
        let receipt = match gateway.submit_commitment(&self.request) {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(e)),
        };

        self.committed_at = Some(receipt.confirmed_at);
        self.commitment_id = Some(receipt.commitment_id.clone());
        self.state = FlowState::Committed;
        // The commit confirmation is the only event in this phase; nothing
        // else happens until the caller waits out the window.
        self.state = FlowState::AwaitingMaturity;

        info!(
            "committed at {}, reveal window opens in {}s",
            receipt.confirmed_at,
            self.min_wait.as_secs()
        );
        Ok(receipt)
    }

    /// Phase 2: reveal. Validates the commitment window locally, re-fetches
    /// the quote, and submits the register transaction with the freshly
    /// computed payment value.
    pub fn register(&mut self, gateway: &impl ChainGateway) -> Result<RegisterReceipt, FlowError> {
        let committed_at = match (&self.state, self.committed_at) {
            (FlowState::AwaitingMaturity, Some(committed_at)) => committed_at,
            _ => {
                return Err(FlowError::InvalidFlowState {
                    expected: "AwaitingMaturity".to_string(),
                })
            }
        };

        let elapsed = (Utc::now() - committed_at).to_std().unwrap_or_default();
        if elapsed < self.min_wait || elapsed > self.max_wait {
            let error = FlowError::CommitmentWindowViolated {
                elapsed_secs: elapsed.as_secs(),
                min_secs: self.min_wait.as_secs(),
                max_secs: self.max_wait.as_secs(),
            };
            // An expired commitment is unrecoverable; a premature call is
            // not. Stay in AwaitingMaturity when the window has not opened
            // yet so the caller can retry once it does, without wasting the
            // still-valid commitment.
            if elapsed > self.max_wait {
                return Err(self.fail(error));
            }
            warn!("register too early: {}", error);
            return Err(error);
        }

        // Never reuse the commit-time price: the oracle can drift between
        // phases and the contract checks against its live quote.
        let quote = match gateway.get_price_quote(&self.request.name, self.request.duration) {
            Ok(quote) => quote,
            Err(e) => return Err(self.fail(e)),
        };
        let prices = compute_prices(&quote);
        debug!(
            "register={} payment={} fee={}",
            prices.register_value, prices.payment_value, prices.fee_value
        );

        let receipt = match gateway.submit_registration(&self.request, prices.payment_value) {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = FlowState::Registered;
        info!(
            "registered {:?} in tx {} at {}",
            self.request.name, receipt.tx_id, receipt.confirmed_at
        );
        Ok(receipt)
    }

    /// Run the full two-phase protocol. The caller supplies the wait
    /// strategy (blocking sleep, scheduler hook, test no-op) and receives
    /// the minimum wait the flow requires.
    pub fn run(
        &mut self,
        gateway: &impl ChainGateway,
        wait: impl FnOnce(Duration),
    ) -> Result<RegisterReceipt, FlowError> {
        self.commit(gateway)?;
        wait(self.min_wait);
        self.register(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_commitment_request, derive_secret, Address, PriceQuote};
    use chrono::Duration as ChronoDuration;
    use std::str::FromStr;
    use std::sync::Mutex;

    /// Gateway double that records calls and lets tests backdate the commit
    /// confirmation or drift the quote between phases.
    struct FakeGateway {
        quote: Mutex<PriceQuote>,
        confirmed_ago: ChronoDuration,
        commit_error: Option<FlowError>,
        register_error: Option<FlowError>,
        calls: Mutex<Vec<String>>,
        submitted_values: Mutex<Vec<u128>>,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                quote: Mutex::new(PriceQuote::new(100, 0)),
                confirmed_ago: ChronoDuration::zero(),
                commit_error: None,
                register_error: None,
                calls: Mutex::new(Vec::new()),
                submitted_values: Mutex::new(Vec::new()),
            }
        }

        fn confirmed_ago(mut self, ago: ChronoDuration) -> Self {
            self.confirmed_ago = ago;
            self
        }

        fn set_quote(&self, quote: PriceQuote) {
            *self.quote.lock().unwrap() = quote;
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChainGateway for FakeGateway {
        fn get_price_quote(&self, _name: &str, _duration: u64) -> Result<PriceQuote, FlowError> {
            self.calls.lock().unwrap().push("quote".to_string());
            Ok(*self.quote.lock().unwrap())
        }

        fn submit_commitment(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<CommitReceipt, FlowError> {
            self.calls.lock().unwrap().push("commit".to_string());
            if let Some(error) = &self.commit_error {
                return Err(error.clone());
            }
            Ok(CommitReceipt {
                commitment_id: "0xc0ffee".to_string(),
                confirmed_at: Utc::now() - self.confirmed_ago,
            })
        }

        fn submit_registration(
            &self,
            _request: &RegistrationRequest,
            value: u128,
        ) -> Result<RegisterReceipt, FlowError> {
            self.calls.lock().unwrap().push("register".to_string());
            self.submitted_values.lock().unwrap().push(value);
            if let Some(error) = &self.register_error {
                return Err(error.clone());
            }
            Ok(RegisterReceipt {
                tx_id: "0xfeed".to_string(),
                confirmed_at: Utc::now(),
            })
        }
    }

    fn flow(min_secs: u64, max_secs: u64) -> RegistrationFlow {
        let request = build_commitment_request(
            "billal.test",
            Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap(),
            3600,
            derive_secret(None, None).unwrap(),
            Address::from_str("0xa48a285BAb4061e9104EeA29f968b1B801423E32").unwrap(),
            vec![],
            false,
            0,
        )
        .unwrap();
        RegistrationFlow::new(
            request,
            Duration::from_secs(min_secs),
            Duration::from_secs(max_secs),
        )
    }

    #[test]
    fn test_happy_path() {
        let gateway = FakeGateway::new();
        let mut flow = flow(0, 86400);

        flow.commit(&gateway).unwrap();
        assert_eq!(*flow.state(), FlowState::AwaitingMaturity);
        assert_eq!(flow.commitment_id(), Some("0xc0ffee"));

        flow.register(&gateway).unwrap();
        assert_eq!(*flow.state(), FlowState::Registered);
        assert_eq!(gateway.calls(), vec!["commit", "quote", "register"]);
    }

    #[test]
    fn test_register_before_min_wait_makes_no_network_call() {
        let gateway = FakeGateway::new();
        let mut flow = flow(60, 86400);

        flow.commit(&gateway).unwrap();
        let err = flow.register(&gateway).unwrap_err();

        assert!(matches!(err, FlowError::CommitmentWindowViolated { .. }));
        // The commitment is still valid on-chain; the flow stays retryable.
        assert_eq!(*flow.state(), FlowState::AwaitingMaturity);
        // Only the commit reached the gateway.
        assert_eq!(gateway.calls(), vec!["commit"]);
    }

    #[test]
    fn test_premature_register_can_be_retried_once_window_opens() {
        let gateway = FakeGateway::new();
        let mut flow = flow(1, 86400);

        flow.commit(&gateway).unwrap();
        let err = flow.register(&gateway).unwrap_err();
        assert!(matches!(err, FlowError::CommitmentWindowViolated { .. }));
        assert_eq!(*flow.state(), FlowState::AwaitingMaturity);

        std::thread::sleep(Duration::from_millis(1100));

        flow.register(&gateway).unwrap();
        assert_eq!(*flow.state(), FlowState::Registered);
        assert_eq!(gateway.calls(), vec!["commit", "quote", "register"]);
    }

    #[test]
    fn test_register_after_max_wait_fails() {
        let gateway = FakeGateway::new().confirmed_ago(ChronoDuration::hours(2));
        let mut flow = flow(60, 3600);

        flow.commit(&gateway).unwrap();
        let err = flow.register(&gateway).unwrap_err();

        match err {
            FlowError::CommitmentWindowViolated {
                elapsed_secs,
                min_secs,
                max_secs,
            } => {
                assert!(elapsed_secs >= 7200);
                assert_eq!(min_secs, 60);
                assert_eq!(max_secs, 3600);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(gateway.calls(), vec!["commit"]);
    }

    #[test]
    fn test_register_inside_window() {
        let gateway = FakeGateway::new().confirmed_ago(ChronoDuration::seconds(120));
        let mut flow = flow(60, 3600);

        flow.commit(&gateway).unwrap();
        flow.register(&gateway).unwrap();
        assert_eq!(*flow.state(), FlowState::Registered);
    }

    #[test]
    fn test_price_is_refetched_before_register() {
        let gateway = FakeGateway::new();
        let mut flow = flow(0, 86400);

        flow.commit(&gateway).unwrap();
        // Oracle drifts between commit and register.
        gateway.set_quote(PriceQuote::new(200, 0));
        flow.register(&gateway).unwrap();

        let values = gateway.submitted_values.lock().unwrap().clone();
        // 200 * 115 / 100, not the commit-time 115.
        assert_eq!(values, vec![230]);
    }

    #[test]
    fn test_commit_revert_fails_flow() {
        let mut gateway = FakeGateway::new();
        gateway.commit_error = Some(FlowError::UnexpiredCommitmentExists);
        let mut flow = flow(0, 86400);

        let err = flow.commit(&gateway).unwrap_err();
        assert_eq!(err, FlowError::UnexpiredCommitmentExists);
        assert_eq!(
            *flow.state(),
            FlowState::Failed(FlowError::UnexpiredCommitmentExists)
        );
    }

    #[test]
    fn test_register_revert_fails_flow() {
        let mut gateway = FakeGateway::new();
        gateway.register_error = Some(FlowError::InsufficientValue);
        let mut flow = flow(0, 86400);

        flow.commit(&gateway).unwrap();
        let err = flow.register(&gateway).unwrap_err();
        assert_eq!(err, FlowError::InsufficientValue);
        assert_eq!(
            *flow.state(),
            FlowState::Failed(FlowError::InsufficientValue)
        );
    }

    #[test]
    fn test_transport_error_is_terminal_for_attempt() {
        let mut gateway = FakeGateway::new();
        gateway.register_error = Some(FlowError::TransportError("node down".to_string()));
        let mut flow = flow(0, 86400);

        flow.commit(&gateway).unwrap();
        let err = flow.register(&gateway).unwrap_err();
        assert!(err.is_transport());

        // The attempt is done; a retry needs a fresh flow and secret.
        let err = flow.register(&gateway).unwrap_err();
        assert!(matches!(err, FlowError::InvalidFlowState { .. }));
    }

    #[test]
    fn test_state_guards() {
        let gateway = FakeGateway::new();
        let mut flow = flow(0, 86400);

        // Register before commit.
        assert!(matches!(
            flow.register(&gateway).unwrap_err(),
            FlowError::InvalidFlowState { .. }
        ));

        flow.commit(&gateway).unwrap();
        // Double commit.
        assert!(matches!(
            flow.commit(&gateway).unwrap_err(),
            FlowError::InvalidFlowState { .. }
        ));
    }

    #[test]
    fn test_run_convenience() {
        let gateway = FakeGateway::new();
        let mut flow = flow(0, 86400);

        let mut waited = None;
        flow.run(&gateway, |d| waited = Some(d)).unwrap();

        assert_eq!(waited, Some(Duration::from_secs(0)));
        assert_eq!(*flow.state(), FlowState::Registered);
    }
}
