//! # Selection Orchestrator
//!
//! Drives each dispute's [`SelectionRecord`] from `Pending` to a terminal
//! state. Every entry point runs to completion atomically: a rejected call
//! leaves the orchestrator, the pool, and the record exactly as they were.
//!
//! ## Security Properties
//!
//! - **Single assignment point**: both resolution paths (oracle callback
//!   and deterministic fallback) converge on `SelectionRecord::assign`,
//!   which refuses a second write
//! - **Resolution-time truth**: the weight table is rebuilt from the
//!   CURRENT pool state when randomness arrives — an arbitrator who
//!   deactivated or saturated after the request cannot be selected
//! - **Nothing persisted on rejection**: an empty pool or a failed oracle
//!   emit leaves no record behind, so the dispute can be re-requested

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use openarbiter_pool::ArbitratorPoolManager;
use openarbiter_types::{
    ArbiterError, ArbitratorId, FiatCurrency, OracleRequestId, RandomnessSource, Result,
    SelectionConfig, SelectionMethod, SelectionRecord, SelectionState, TradeId, VrfPayload,
    randomness_to_u128,
};

use crate::fallback::derive_fallback_value;
use crate::oracle::OracleClient;

/// Per-dispute selection state machine driver.
#[derive(Debug)]
pub struct SelectionOrchestrator {
    /// One record per disputed trade. Records are never removed; terminal
    /// records are the durable assignment history.
    selections: HashMap<TradeId, SelectionRecord>,
    config: SelectionConfig,
}

impl SelectionOrchestrator {
    /// Creates an orchestrator with no open disputes.
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            selections: HashMap::new(),
            config,
        }
    }

    // ----------------------------------------------------------------
    // Entry points
    // ----------------------------------------------------------------

    /// The trade state machine's entry: opens a dispute and immediately
    /// requests selection.
    ///
    /// # Errors
    /// - `AlreadySelected` if this trade already has an assigned arbitrator
    /// - `InvalidState` if any other record already exists for the trade
    /// - `NoEligibleArbitrator` if the currency's pool has no
    ///   positive-weight member (nothing is persisted)
    /// - any oracle emit error (nothing is persisted)
    pub fn open_dispute(
        &mut self,
        trade_id: TradeId,
        currency: FiatCurrency,
        source: RandomnessSource,
        pool: &ArbitratorPoolManager,
        oracle: &mut impl OracleClient,
        now: DateTime<Utc>,
    ) -> Result<OracleRequestId> {
        if let Some(existing) = self.selections.get(&trade_id) {
            if existing.is_selected() {
                return Err(ArbiterError::AlreadySelected(trade_id));
            }
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Dispute for trade {trade_id} already open in {}",
                    existing.state
                ),
            });
        }
        self.request_inner(trade_id, currency, source, pool, oracle, now)
    }

    /// Requests selection for a trade. Valid when no record exists or the
    /// record is still `Pending` (the retry path after an atomic
    /// rejection).
    ///
    /// # Errors
    /// - `AlreadySelected` / `InvalidState` per the idempotency rules
    /// - `NoEligibleArbitrator` when the pool is empty (nothing persisted,
    ///   a pre-existing `Pending` record is left untouched)
    /// - any oracle emit error (same atomicity)
    pub fn request_selection(
        &mut self,
        trade_id: TradeId,
        currency: FiatCurrency,
        source: RandomnessSource,
        pool: &ArbitratorPoolManager,
        oracle: &mut impl OracleClient,
        now: DateTime<Utc>,
    ) -> Result<OracleRequestId> {
        match self.selections.get(&trade_id) {
            None => {}
            Some(rec) if rec.state == SelectionState::Pending => {}
            Some(rec) if rec.is_selected() => {
                return Err(ArbiterError::AlreadySelected(trade_id));
            }
            Some(rec) => {
                return Err(ArbiterError::InvalidState {
                    reason: format!(
                        "Cannot re-request selection for trade {trade_id} in {}",
                        rec.state
                    ),
                });
            }
        }
        self.request_inner(trade_id, currency, source, pool, oracle, now)
    }

    /// The oracle callback: verifies the payload, rebuilds the weight
    /// table from the current pool state, and commits the assignment.
    ///
    /// # Errors
    /// - `SelectionNotFound` for unknown trades
    /// - `AlreadySelected` / `InvalidState` per the state machine
    /// - `RandomnessInvalid` if the proof fails (record unchanged)
    /// - `NoEligibleArbitrator` if the pool emptied since the request
    ///   (the record transitions to `Failed`)
    pub fn on_randomness_received(
        &mut self,
        trade_id: TradeId,
        payload: &VrfPayload,
        pool: &mut ArbitratorPoolManager,
        now: DateTime<Utc>,
    ) -> Result<ArbitratorId> {
        let record = self
            .selections
            .get_mut(&trade_id)
            .ok_or(ArbiterError::SelectionNotFound(trade_id))?;
        match record.state {
            SelectionState::ArbitratorSelected => {
                return Err(ArbiterError::AlreadySelected(trade_id));
            }
            SelectionState::RandomnessRequested => {}
            state => {
                return Err(ArbiterError::InvalidState {
                    reason: format!("Randomness arrived for trade {trade_id} in {state}"),
                });
            }
        }
        let request_id = record.oracle_request.ok_or_else(|| {
            ArbiterError::Internal(format!(
                "Record for trade {trade_id} is RANDOMNESS_REQUESTED without a request handle"
            ))
        })?;
        payload.verify(&record.source, trade_id, request_id)?;

        Self::resolve(record, payload.value, SelectionMethod::VrfOracle, pool, now)
    }

    /// Marks the oracle round trip as failed, arming the fallback path
    /// without waiting for the timeout.
    ///
    /// # Errors
    /// - `SelectionNotFound` for unknown trades
    /// - `AlreadySelected` / `InvalidState` per the state machine
    pub fn on_oracle_failure(&mut self, trade_id: TradeId) -> Result<()> {
        let record = self
            .selections
            .get_mut(&trade_id)
            .ok_or(ArbiterError::SelectionNotFound(trade_id))?;
        record.mark_oracle_failed()?;
        tracing::warn!(trade = %trade_id, "Oracle reported failure; fallback armed");
        Ok(())
    }

    /// Deterministic fallback selection. Callable only while the record is
    /// `RandomnessRequested` AND the fallback is armed: the configured
    /// timeout elapsed since the request, or the oracle reported failure.
    ///
    /// A racing oracle callback that lands after the fallback has assigned
    /// fails `AlreadySelected` — never silently ignored.
    ///
    /// # Errors
    /// - `SelectionNotFound` for unknown trades
    /// - `AlreadySelected` / `InvalidState` per the state machine and
    ///   arming rule
    /// - `NoEligibleArbitrator` if the pool emptied in the interim (the
    ///   record transitions to `Failed`)
    pub fn fallback_select(
        &mut self,
        trade_id: TradeId,
        slot: u64,
        pool: &mut ArbitratorPoolManager,
        now: DateTime<Utc>,
    ) -> Result<ArbitratorId> {
        let record = self
            .selections
            .get_mut(&trade_id)
            .ok_or(ArbiterError::SelectionNotFound(trade_id))?;
        match record.state {
            SelectionState::ArbitratorSelected => {
                return Err(ArbiterError::AlreadySelected(trade_id));
            }
            SelectionState::RandomnessRequested => {}
            state => {
                return Err(ArbiterError::InvalidState {
                    reason: format!("Fallback requested for trade {trade_id} in {state}"),
                });
            }
        }
        let requested_at = record.requested_at.ok_or_else(|| {
            ArbiterError::Internal(format!(
                "Record for trade {trade_id} is RANDOMNESS_REQUESTED without a request timestamp"
            ))
        })?;
        let elapsed = now
            .signed_duration_since(requested_at)
            .to_std()
            .unwrap_or_default();
        if !record.oracle_failed && elapsed < self.config.fallback_timeout() {
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Fallback for trade {trade_id} not armed: {}ms of {}ms elapsed, no oracle failure",
                    elapsed.as_millis(),
                    self.config.fallback_timeout_ms
                ),
            });
        }

        let value = derive_fallback_value(trade_id, slot, &pool.weight_table(&record.currency));
        Self::resolve(
            record,
            value,
            SelectionMethod::DeterministicFallback,
            pool,
            now,
        )
    }

    // ----------------------------------------------------------------
    // Read surface
    // ----------------------------------------------------------------

    /// The assigned arbitrator for a trade, once selection completed.
    #[must_use]
    pub fn get_selected_arbitrator(&self, trade_id: TradeId) -> Option<ArbitratorId> {
        self.selections.get(&trade_id).and_then(|rec| rec.selected)
    }

    /// The full selection record for a trade.
    #[must_use]
    pub fn selection(&self, trade_id: TradeId) -> Option<&SelectionRecord> {
        self.selections.get(&trade_id)
    }

    /// Number of disputes ever opened (terminal records included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Returns `true` if no dispute was ever opened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    // ----------------------------------------------------------------
    // Internals
    // ----------------------------------------------------------------

    /// Shared request path. Preconditions (no record, or `Pending`) are
    /// validated by the callers; everything here is atomic: the empty-pool
    /// check and the oracle emit both happen before any state is written.
    fn request_inner(
        &mut self,
        trade_id: TradeId,
        currency: FiatCurrency,
        source: RandomnessSource,
        pool: &ArbitratorPoolManager,
        oracle: &mut impl OracleClient,
        now: DateTime<Utc>,
    ) -> Result<OracleRequestId> {
        let table = pool.weight_table(&currency);
        if table.is_empty() {
            tracing::warn!(
                trade = %trade_id,
                currency = %currency,
                "Selection rejected: no eligible arbitrator"
            );
            return Err(ArbiterError::NoEligibleArbitrator { currency });
        }
        let request_id = oracle.request_randomness(trade_id, &source)?;

        let mut record = match self.selections.remove(&trade_id) {
            Some(mut existing) => {
                existing.currency = currency;
                existing.source = source;
                existing
            }
            None => SelectionRecord::new(trade_id, currency, source, now),
        };
        record.mark_requested(request_id, now)?;
        tracing::info!(
            trade = %trade_id,
            request = %request_id,
            candidates = table.len(),
            "Randomness requested"
        );
        self.selections.insert(trade_id, record);
        Ok(request_id)
    }

    /// Shared resolution path: weighted pick from the CURRENT pool state,
    /// single-assignment commit, winner's case count bump.
    fn resolve(
        record: &mut SelectionRecord,
        randomness: [u8; 32],
        method: SelectionMethod,
        pool: &mut ArbitratorPoolManager,
        now: DateTime<Utc>,
    ) -> Result<ArbitratorId> {
        let trade_id = record.trade_id;
        let table = pool.weight_table(&record.currency);
        if table.is_empty() {
            record.fail("No eligible arbitrator at resolution", now)?;
            tracing::warn!(trade = %trade_id, "Selection failed: pool emptied before resolution");
            return Err(ArbiterError::NoEligibleArbitrator {
                currency: record.currency.clone(),
            });
        }
        let winner = table.select(randomness_to_u128(&randomness)).ok_or_else(|| {
            ArbiterError::Internal(format!("Non-empty weight table selected nothing for {trade_id}"))
        })?;
        record.assign(winner, randomness, method, now)?;
        pool.case_opened(winner, now)?;
        tracing::info!(
            trade = %trade_id,
            arbitrator = %winner,
            method = %method,
            "Arbitrator selected"
        );
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::RecordingOracle;
    use ed25519_dalek::SigningKey;
    use openarbiter_types::{AccountId, PoolConfig};
    use std::collections::BTreeSet;

    fn usd() -> FiatCurrency {
        FiatCurrency::new("USD")
    }

    fn pool_with(seeds: &[u8]) -> ArbitratorPoolManager {
        let mut pool =
            ArbitratorPoolManager::new(AccountId([0x5E; 32]), PoolConfig::default());
        for &seed in seeds {
            let currencies: BTreeSet<FiatCurrency> = [usd()].into_iter().collect();
            pool.register(ArbitratorId([seed; 32]), currencies, [seed; 32], Utc::now())
                .unwrap();
        }
        pool
    }

    fn orchestrator() -> SelectionOrchestrator {
        SelectionOrchestrator::new(SelectionConfig::default())
    }

    fn unverified_source() -> RandomnessSource {
        RandomnessSource::unverified(AccountId([0xAB; 32]))
    }

    fn any_payload() -> VrfPayload {
        VrfPayload {
            value: [7u8; 32],
            proof: vec![0u8; 64],
        }
    }

    // ──────────────────── open / request ────────────────────

    #[test]
    fn open_dispute_requests_randomness() {
        let pool = pool_with(&[1, 2]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        let request = orch
            .open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        assert_eq!(oracle.requests, vec![(trade, request)]);

        let rec = orch.selection(trade).unwrap();
        assert_eq!(rec.state, SelectionState::RandomnessRequested);
        assert_eq!(rec.oracle_request, Some(request));
    }

    #[test]
    fn open_dispute_twice_rejected() {
        let pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        let err = orch
            .open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::InvalidState { .. }));
        assert_eq!(oracle.requests.len(), 1, "no second oracle emit");
    }

    #[test]
    fn empty_pool_is_atomic_rejection() {
        let pool = pool_with(&[]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        let err = orch
            .open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::NoEligibleArbitrator { .. }));
        assert!(orch.selection(trade).is_none(), "nothing persisted");
        assert!(oracle.requests.is_empty(), "no oracle emit");
    }

    #[test]
    fn rejected_dispute_can_be_rerequested_after_registration() {
        let mut pool = pool_with(&[]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        assert!(
            orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
                .is_err()
        );
        // An arbitrator registers; the same dispute goes through now.
        let currencies: BTreeSet<FiatCurrency> = [usd()].into_iter().collect();
        pool.register(ArbitratorId([9u8; 32]), currencies, [9u8; 32], Utc::now())
            .unwrap();
        assert!(
            orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
                .is_ok()
        );
    }

    #[test]
    fn oracle_emit_failure_persists_nothing() {
        let pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        oracle.fail_next = true;
        let trade = TradeId::new();

        let err = orch
            .open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::Io(_)));
        assert!(orch.selection(trade).is_none());

        // Retry succeeds once the oracle recovers.
        assert!(
            orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
                .is_ok()
        );
    }

    #[test]
    fn request_selection_rejects_while_requested() {
        let pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        let err = orch
            .request_selection(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::InvalidState { .. }));
    }

    // ──────────────────── oracle callback ────────────────────

    #[test]
    fn callback_selects_and_bumps_case_count() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        let winner = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap();
        assert_eq!(winner, ArbitratorId([1u8; 32]));
        assert_eq!(orch.get_selected_arbitrator(trade), Some(winner));
        assert_eq!(pool.get(winner).unwrap().open_cases, 1);

        let rec = orch.selection(trade).unwrap();
        assert_eq!(rec.method, Some(SelectionMethod::VrfOracle));
        assert_eq!(rec.randomness, Some([7u8; 32]));
    }

    #[test]
    fn callback_for_unknown_trade() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let err = orch
            .on_randomness_received(TradeId::new(), &any_payload(), &mut pool, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::SelectionNotFound(_)));
    }

    #[test]
    fn double_callback_rejected_with_already_selected() {
        let mut pool = pool_with(&[1, 2]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        let first = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap();
        let err = orch
            .on_randomness_received(
                trade,
                &VrfPayload {
                    value: [0xFF; 32],
                    proof: vec![1u8; 64],
                },
                &mut pool,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, ArbiterError::AlreadySelected(_)));
        assert_eq!(
            orch.get_selected_arbitrator(trade),
            Some(first),
            "assignment is immutable"
        );
    }

    #[test]
    fn verified_source_rejects_bad_proof() {
        let key = SigningKey::from_bytes(&[42u8; 32]);
        let account = AccountId([0xAB; 32]);
        let source = RandomnessSource::verified(account, key.verifying_key().to_bytes());
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), source, &pool, &mut oracle, Utc::now())
            .unwrap();
        let err = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::RandomnessInvalid { .. }));
        // Record unchanged: a correct payload still resolves it.
        let rec = orch.selection(trade).unwrap();
        assert_eq!(rec.state, SelectionState::RandomnessRequested);

        let request_id = rec.oracle_request.unwrap();
        let good = VrfPayload::generate(&key, trade, request_id, account);
        assert!(
            orch.on_randomness_received(trade, &good, &mut pool, Utc::now())
                .is_ok()
        );
    }

    #[test]
    fn callback_after_pool_emptied_fails_terminally() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        pool.deactivate(ArbitratorId([1u8; 32]), ArbitratorId([1u8; 32]), Utc::now())
            .unwrap();

        let err = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::NoEligibleArbitrator { .. }));
        let rec = orch.selection(trade).unwrap();
        assert_eq!(rec.state, SelectionState::Failed);
        assert!(rec.failure_reason.is_some());
    }

    #[test]
    fn deactivated_arbitrator_excluded_at_resolution() {
        // Two candidates at request time; one deactivates before the
        // callback. Every randomness value must now pick the survivor.
        let mut pool = pool_with(&[1, 2]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        pool.deactivate(ArbitratorId([1u8; 32]), ArbitratorId([1u8; 32]), Utc::now())
            .unwrap();

        let winner = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap();
        assert_eq!(winner, ArbitratorId([2u8; 32]));
    }

    // ──────────────────── fallback ────────────────────

    #[test]
    fn fallback_blocked_before_timeout() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        let err = orch
            .fallback_select(trade, 500, &mut pool, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::InvalidState { .. }));
        assert_eq!(
            orch.selection(trade).unwrap().state,
            SelectionState::RandomnessRequested
        );
    }

    #[test]
    fn fallback_allowed_after_timeout() {
        let mut pool = pool_with(&[1, 2]);
        let mut orch = SelectionOrchestrator::new(SelectionConfig {
            fallback_timeout_ms: 1_000,
        });
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();
        let opened = Utc::now();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, opened)
            .unwrap();
        let later = opened + chrono::Duration::milliseconds(1_001);
        let winner = orch.fallback_select(trade, 500, &mut pool, later).unwrap();

        let rec = orch.selection(trade).unwrap();
        assert_eq!(rec.method, Some(SelectionMethod::DeterministicFallback));
        assert_eq!(rec.selected, Some(winner));
        assert_eq!(pool.get(winner).unwrap().open_cases, 1);
    }

    #[test]
    fn oracle_failure_arms_fallback_immediately() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();
        let opened = Utc::now();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, opened)
            .unwrap();
        orch.on_oracle_failure(trade).unwrap();
        // No timeout needed once the oracle reported failure.
        assert!(orch.fallback_select(trade, 500, &mut pool, opened).is_ok());
    }

    #[test]
    fn fallback_is_deterministic() {
        let run = |slot: u64| {
            let mut pool = pool_with(&[1, 2, 3]);
            let mut orch = orchestrator();
            let mut oracle = RecordingOracle::new();
            let trade = TradeId::deterministic(77, 0);
            let opened = Utc::now();
            orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, opened)
                .unwrap();
            orch.on_oracle_failure(trade).unwrap();
            orch.fallback_select(trade, slot, &mut pool, opened).unwrap()
        };
        assert_eq!(run(500), run(500));
    }

    #[test]
    fn oracle_callback_after_fallback_rejected() {
        let mut pool = pool_with(&[1, 2]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();
        let opened = Utc::now();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, opened)
            .unwrap();
        orch.on_oracle_failure(trade).unwrap();
        let winner = orch.fallback_select(trade, 500, &mut pool, opened).unwrap();

        // The slow oracle answer arrives afterwards.
        let err = orch
            .on_randomness_received(trade, &any_payload(), &mut pool, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ArbiterError::AlreadySelected(_)));
        assert_eq!(orch.get_selected_arbitrator(trade), Some(winner));
    }

    #[test]
    fn fallback_after_failed_record_rejected() {
        let mut pool = pool_with(&[1]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade = TradeId::new();
        let opened = Utc::now();

        orch.open_dispute(trade, usd(), unverified_source(), &pool, &mut oracle, opened)
            .unwrap();
        pool.deactivate(ArbitratorId([1u8; 32]), ArbitratorId([1u8; 32]), Utc::now())
            .unwrap();
        orch.on_oracle_failure(trade).unwrap();
        // Pool emptied: the fallback fails the record terminally...
        assert!(matches!(
            orch.fallback_select(trade, 500, &mut pool, opened),
            Err(ArbiterError::NoEligibleArbitrator { .. })
        ));
        // ...and any further resolution attempt is InvalidState.
        assert!(matches!(
            orch.fallback_select(trade, 500, &mut pool, opened),
            Err(ArbiterError::InvalidState { .. })
        ));
    }

    #[test]
    fn independent_trades_do_not_interfere() {
        let mut pool = pool_with(&[1, 2, 3]);
        let mut orch = orchestrator();
        let mut oracle = RecordingOracle::new();
        let trade_a = TradeId::new();
        let trade_b = TradeId::new();

        orch.open_dispute(trade_a, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        orch.open_dispute(trade_b, usd(), unverified_source(), &pool, &mut oracle, Utc::now())
            .unwrap();
        assert_eq!(orch.len(), 2);

        orch.on_randomness_received(trade_a, &any_payload(), &mut pool, Utc::now())
            .unwrap();
        // Trade B is still waiting.
        assert_eq!(
            orch.selection(trade_b).unwrap().state,
            SelectionState::RandomnessRequested
        );
    }
}
