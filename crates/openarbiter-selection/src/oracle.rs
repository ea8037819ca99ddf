//! The outbound oracle seam.
//!
//! The orchestrator never talks to a randomness oracle directly; it emits
//! requests through an [`OracleClient`] and receives the answer later via
//! `on_randomness_received`. Adapters for concrete oracles live outside
//! this crate and implement the trait.

use openarbiter_types::{OracleRequestId, RandomnessSource, Result, TradeId};

/// Outbound half of the oracle round trip.
///
/// A request that cannot be emitted must return an error; the
/// orchestrator persists nothing in that case, so the dispute can be
/// re-requested cleanly.
pub trait OracleClient {
    /// Emits a randomness request for `trade_id` against `source`.
    /// Returns the handle the later callback will reference.
    fn request_randomness(
        &mut self,
        trade_id: TradeId,
        source: &RandomnessSource,
    ) -> Result<OracleRequestId>;
}

/// In-memory oracle that records every emitted request.
/// **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingOracle {
    /// Every request emitted, in order.
    pub requests: Vec<(TradeId, OracleRequestId)>,
    /// When set, the next emit fails and the flag clears.
    pub fail_next: bool,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingOracle {
    /// Creates an oracle that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The request handle most recently issued.
    #[must_use]
    pub fn last_request(&self) -> Option<OracleRequestId> {
        self.requests.last().map(|&(_, id)| id)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl OracleClient for RecordingOracle {
    fn request_randomness(
        &mut self,
        trade_id: TradeId,
        _source: &RandomnessSource,
    ) -> Result<OracleRequestId> {
        if self.fail_next {
            self.fail_next = false;
            return Err(openarbiter_types::ArbiterError::Io(
                "oracle unavailable".into(),
            ));
        }
        let request_id = OracleRequestId::new();
        self.requests.push((trade_id, request_id));
        Ok(request_id)
    }
}
