//! # SelectionRecord: per-dispute arbitrator assignment state machine
//!
//! One `SelectionRecord` exists per disputed trade. It tracks the dispute
//! from the moment the trade state machine opens it until an arbitrator is
//! assigned (or the selection terminally fails).
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐ request  ┌──────────────────────┐ callback ┌─────────────────────┐
//!   │ PENDING ├─────────▶│ RANDOMNESS_REQUESTED ├─────────▶│ RANDOMNESS_RECEIVED │
//!   └─────────┘          └──────────────────────┘          └──────────┬──────────┘
//!                                                           weighted  │
//!                                                           pick      ▼
//!                                                          ┌─────────────────────┐
//!                                                          │ ARBITRATOR_SELECTED │
//!                                                          └─────────────────────┘
//! ```
//!
//! Every non-terminal state can also reach terminal `FAILED` (pool emptied
//! at resolution time). `RANDOMNESS_RECEIVED` is traversed inside the
//! resolution call itself, so observers only ever see `PENDING`,
//! `RANDOMNESS_REQUESTED`, and the two terminals.
//!
//! ## Security Properties
//!
//! - **Single assignment**: [`SelectionRecord::assign`] is the only write
//!   path for the selected arbitrator; once written it can never change
//! - **Monotonic**: transitions never go backwards; terminal states accept
//!   no further transitions
//! - **Auditable**: the raw randomness payload and the selection method
//!   (oracle vs fallback) are retained on the record forever

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ArbiterError, ArbitratorId, FiatCurrency, OracleRequestId, RandomnessSource, TradeId};

/// The lifecycle state of a dispute's arbitrator selection.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Pending → RandomnessRequested` (oracle request emitted)
/// - `RandomnessRequested → RandomnessReceived` (verified payload arrived)
/// - `RandomnessReceived → ArbitratorSelected` (weighted pick committed)
/// - any non-terminal `→ Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionState {
    /// Dispute opened; no oracle request emitted yet.
    Pending,
    /// Waiting on the randomness oracle callback.
    RandomnessRequested,
    /// Verified randomness in hand; selection in progress. Never observed
    /// across an entry-point boundary.
    RandomnessReceived,
    /// An arbitrator is assigned. **Irreversible.** This is what makes the
    /// assignment immune to re-rolling.
    ArbitratorSelected,
    /// Selection terminally failed (no eligible arbitrator at resolution).
    Failed,
}

impl SelectionState {
    /// Can this record transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::RandomnessRequested | Self::Failed)
                | (
                    Self::RandomnessRequested,
                    Self::RandomnessReceived | Self::Failed
                )
                | (
                    Self::RandomnessReceived,
                    Self::ArbitratorSelected | Self::Failed
                )
        )
    }

    /// Terminal states accept no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ArbitratorSelected | Self::Failed)
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::RandomnessRequested => write!(f, "RANDOMNESS_REQUESTED"),
            Self::RandomnessReceived => write!(f, "RANDOMNESS_RECEIVED"),
            Self::ArbitratorSelected => write!(f, "ARBITRATOR_SELECTED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// How the winning arbitrator was chosen. Recorded on assignment and
/// never changed, so audits can distinguish oracle picks from fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Verified randomness delivered by the oracle callback.
    VrfOracle,
    /// Deterministic derivation after oracle timeout or reported failure.
    DeterministicFallback,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VrfOracle => write!(f, "VRF_ORACLE"),
            Self::DeterministicFallback => write!(f, "DETERMINISTIC_FALLBACK"),
        }
    }
}

/// Per-trade selection record. Owned exclusively by the orchestrator;
/// the settlement path only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// The disputed trade.
    pub trade_id: TradeId,
    /// Fiat currency of the trade; decides which pool is consulted.
    pub currency: FiatCurrency,
    /// Where randomness for this dispute comes from.
    pub source: RandomnessSource,
    /// Current lifecycle state.
    pub state: SelectionState,
    /// Oracle request handle, set when the request is emitted.
    pub oracle_request: Option<OracleRequestId>,
    /// Raw 32-byte randomness payload, set at resolution.
    pub randomness: Option<[u8; 32]>,
    /// The assigned arbitrator. Written exactly once.
    pub selected: Option<ArbitratorId>,
    /// How the assignment was made. Written together with `selected`.
    pub method: Option<SelectionMethod>,
    /// The oracle explicitly reported failure for this request.
    pub oracle_failed: bool,
    /// Why the record reached `Failed`. Terminal failures only.
    pub failure_reason: Option<String>,
    /// When the dispute was opened.
    pub created_at: DateTime<Utc>,
    /// When the oracle request was emitted.
    pub requested_at: Option<DateTime<Utc>>,
    /// When the record reached a terminal state.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SelectionRecord {
    /// Creates a `Pending` record for a freshly-opened dispute.
    #[must_use]
    pub fn new(
        trade_id: TradeId,
        currency: FiatCurrency,
        source: RandomnessSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id,
            currency,
            source,
            state: SelectionState::Pending,
            oracle_request: None,
            randomness: None,
            selected: None,
            method: None,
            oracle_failed: false,
            failure_reason: None,
            created_at: now,
            requested_at: None,
            resolved_at: None,
        }
    }

    /// Returns `true` once an arbitrator is assigned.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.state == SelectionState::ArbitratorSelected
    }

    /// Records the emitted oracle request: `Pending → RandomnessRequested`.
    ///
    /// # Errors
    /// Returns `InvalidState` if the record is not `Pending`.
    pub fn mark_requested(
        &mut self,
        request_id: OracleRequestId,
        now: DateTime<Utc>,
    ) -> crate::Result<()> {
        if !self
            .state
            .can_transition_to(SelectionState::RandomnessRequested)
        {
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Cannot transition trade {} from {} to RANDOMNESS_REQUESTED",
                    self.trade_id, self.state
                ),
            });
        }
        self.state = SelectionState::RandomnessRequested;
        self.oracle_request = Some(request_id);
        self.requested_at = Some(now);
        Ok(())
    }

    /// Records an oracle-reported failure. The record stays in
    /// `RandomnessRequested`; the flag arms the fallback path immediately.
    ///
    /// # Errors
    /// Returns `AlreadySelected` after assignment, `InvalidState` from any
    /// other state than `RandomnessRequested`.
    pub fn mark_oracle_failed(&mut self) -> crate::Result<()> {
        if self.is_selected() {
            return Err(ArbiterError::AlreadySelected(self.trade_id));
        }
        if self.state != SelectionState::RandomnessRequested {
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Cannot record oracle failure for trade {} in {}",
                    self.trade_id, self.state
                ),
            });
        }
        self.oracle_failed = true;
        Ok(())
    }

    /// The single assignment point: traverses
    /// `RandomnessRequested → RandomnessReceived → ArbitratorSelected` and
    /// writes the winner. Both hops happen inside this call, so no caller
    /// ever observes the intermediate state.
    ///
    /// # Errors
    /// Returns `AlreadySelected` if an arbitrator was already assigned,
    /// `InvalidState` from any other state than `RandomnessRequested`.
    pub fn assign(
        &mut self,
        arbitrator: ArbitratorId,
        randomness: [u8; 32],
        method: SelectionMethod,
        now: DateTime<Utc>,
    ) -> crate::Result<()> {
        if self.is_selected() {
            return Err(ArbiterError::AlreadySelected(self.trade_id));
        }
        if !self
            .state
            .can_transition_to(SelectionState::RandomnessReceived)
        {
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Cannot assign arbitrator for trade {} in {}",
                    self.trade_id, self.state
                ),
            });
        }
        self.state = SelectionState::RandomnessReceived;
        self.randomness = Some(randomness);
        self.state = SelectionState::ArbitratorSelected;
        self.selected = Some(arbitrator);
        self.method = Some(method);
        self.resolved_at = Some(now);
        Ok(())
    }

    /// Terminal failure: any non-terminal state `→ Failed`.
    ///
    /// # Errors
    /// Returns `AlreadySelected` if an arbitrator was already assigned,
    /// `InvalidState` if the record already failed.
    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> crate::Result<()> {
        if self.is_selected() {
            return Err(ArbiterError::AlreadySelected(self.trade_id));
        }
        if !self.state.can_transition_to(SelectionState::Failed) {
            return Err(ArbiterError::InvalidState {
                reason: format!(
                    "Cannot fail trade {} in terminal state {}",
                    self.trade_id, self.state
                ),
            });
        }
        self.state = SelectionState::Failed;
        self.failure_reason = Some(reason.into());
        self.resolved_at = Some(now);
        Ok(())
    }
}

/// Dummy SelectionRecord for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SelectionRecord {
    /// Create a dummy `Pending` record for unit tests.
    #[must_use]
    pub fn dummy(trade_id: TradeId, currency: &str) -> Self {
        Self::new(
            trade_id,
            FiatCurrency::new(currency),
            RandomnessSource::unverified(crate::AccountId([0xEE; 32])),
            Utc::now(),
        )
    }
}
