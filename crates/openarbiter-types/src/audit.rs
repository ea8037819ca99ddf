//! Audit entries for cross-program invocation attempts.
//!
//! Every call that reaches the CPI guard produces exactly one entry,
//! accepted or rejected. Entries are append-only: once recorded they are
//! never mutated, so the log is a faithful forensic trail of every
//! privileged invocation ever attempted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProgramId, ProgramSlot};

/// Outcome of one guarded invocation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpiOutcome {
    /// All checks passed; the invocation was forwarded.
    Accepted,
    /// A check failed; the invocation never happened.
    Rejected {
        /// The rendered error that blocked the call.
        reason: String,
    },
}

impl CpiOutcome {
    /// Whether this attempt passed validation.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for CpiOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected { reason } => write!(f, "REJECTED: {reason}"),
        }
    }
}

/// One immutable record of a guarded invocation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpiAuditEntry {
    /// Monotonic sequence number, assigned by the log at append time.
    pub seq: u64,
    /// The registry slot the call claimed to target.
    pub slot: ProgramSlot,
    /// The claimed target program id.
    pub target: ProgramId,
    /// The program that asked for the invocation.
    pub caller: ProgramId,
    /// CPI depth at the call site.
    pub depth: u8,
    /// SHA-256 of the forwarded instruction payload. Binds the entry to
    /// WHAT was attempted, not just where.
    pub instruction_digest: [u8; 32],
    /// Validation outcome.
    pub outcome: CpiOutcome,
    /// When the attempt was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl CpiAuditEntry {
    /// Whether this attempt passed validation.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_accepted()
    }
}
