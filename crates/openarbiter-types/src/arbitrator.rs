//! Arbitrator pool records.
//!
//! An [`ArbitratorRecord`] is the durable, per-identity state a pool
//! manager maintains: lifecycle status, the fiat currencies the
//! arbitrator covers, dispute counters, and a reputation score in basis
//! points. Records are created once per identity and survive
//! deactivation; re-registration reactivates the existing record so
//! counters and reputation are never reset.
//!
//! ## Security Properties
//!
//! - Reputation moves only through [`ArbitratorRecord::apply_outcome`],
//!   which clamps to `[0, MAX_REPUTATION_BPS]`.
//! - Counters are monotonic: `cases_handled` and `cases_won` only grow.
//! - `cases_won <= cases_handled` always holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::constants::{
    MAX_REPUTATION_BPS, REPUTATION_GAIN_PER_WIN, REPUTATION_LOSS_PER_LOSS,
};
use crate::{ArbitratorId, FiatCurrency};

/// Lifecycle status of an arbitrator in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitratorStatus {
    /// Eligible for selection (subject to capacity and currency match).
    Active,
    /// Withdrawn from selection. Retains history; may re-register.
    Inactive,
}

impl fmt::Display for ArbitratorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Outcome of a resolved dispute, from the arbitrator's perspective.
///
/// "Won" means the arbitrator's ruling was upheld (not appealed, or
/// appealed and affirmed by the hub).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    Upheld,
    Overturned,
}

impl DisputeOutcome {
    /// Whether this outcome counts as a win for the arbitrator.
    #[must_use]
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Upheld)
    }
}

/// Durable state for one arbitrator identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitratorRecord {
    /// Identity key. Immutable for the record's lifetime.
    pub id: ArbitratorId,
    /// Current lifecycle status.
    pub status: ArbitratorStatus,
    /// Fiat currencies this arbitrator will take disputes in.
    /// Ordered set so per-currency iteration is deterministic.
    pub supported_currencies: BTreeSet<FiatCurrency>,
    /// X25519 public key parties use to encrypt evidence submissions.
    /// Replaced on re-registration; never used for identity.
    pub encryption_key: [u8; 32],
    /// Reputation score in basis points, `0..=MAX_REPUTATION_BPS`.
    pub reputation_bps: u64,
    /// Total disputes this arbitrator has resolved.
    pub cases_handled: u64,
    /// Resolved disputes whose ruling was upheld.
    pub cases_won: u64,
    /// Disputes currently assigned and unresolved.
    pub open_cases: u32,
    /// Maximum concurrently open cases before the arbitrator stops
    /// being eligible for new assignments.
    pub max_case_load: u32,
    /// When the record was first created.
    pub registered_at: DateTime<Utc>,
    /// Last mutation of any field.
    pub updated_at: DateTime<Utc>,
}

impl ArbitratorRecord {
    /// Creates a fresh record with zeroed history.
    #[must_use]
    pub fn new(
        id: ArbitratorId,
        supported_currencies: BTreeSet<FiatCurrency>,
        encryption_key: [u8; 32],
        max_case_load: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status: ArbitratorStatus::Active,
            supported_currencies,
            encryption_key,
            reputation_bps: 0,
            cases_handled: 0,
            cases_won: 0,
            open_cases: 0,
            max_case_load,
            registered_at: now,
            updated_at: now,
        }
    }

    /// Whether the arbitrator is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ArbitratorStatus::Active
    }

    /// Whether the arbitrator has no capacity for another case.
    #[must_use]
    pub fn at_capacity(&self) -> bool {
        self.open_cases >= self.max_case_load
    }

    /// Whether the arbitrator lists `currency`.
    #[must_use]
    pub fn supports(&self, currency: &FiatCurrency) -> bool {
        self.supported_currencies.contains(currency)
    }

    /// Share of handled disputes that were upheld, in basis points.
    /// Zero history scores zero.
    #[must_use]
    pub fn win_ratio_bps(&self) -> u64 {
        if self.cases_handled == 0 {
            return 0;
        }
        self.cases_won * 10_000 / self.cases_handled
    }

    /// Records an assignment: the arbitrator now carries one more open case.
    pub fn open_case(&mut self, now: DateTime<Utc>) {
        self.open_cases += 1;
        self.updated_at = now;
    }

    /// Applies a resolved dispute: closes the open case, bumps counters,
    /// and adjusts reputation (clamped to `[0, MAX_REPUTATION_BPS]`).
    pub fn apply_outcome(&mut self, outcome: DisputeOutcome, now: DateTime<Utc>) {
        self.open_cases = self.open_cases.saturating_sub(1);
        self.cases_handled += 1;
        if outcome.is_win() {
            self.cases_won += 1;
            self.reputation_bps =
                (self.reputation_bps + REPUTATION_GAIN_PER_WIN).min(MAX_REPUTATION_BPS);
        } else {
            self.reputation_bps = self.reputation_bps.saturating_sub(REPUTATION_LOSS_PER_LOSS);
        }
        self.updated_at = now;
    }

    /// Creates a dummy record for testing.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn dummy(seed: u8) -> Self {
        let mut currencies = BTreeSet::new();
        currencies.insert(FiatCurrency::new("USD"));
        Self::new(
            ArbitratorId([seed; 32]),
            currencies,
            rand::random::<[u8; 32]>(),
            crate::constants::DEFAULT_MAX_CASE_LOAD,
            Utc::now(),
        )
    }
}
