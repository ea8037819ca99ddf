//! # openarbiter-selection
//!
//! **Selection Plane**: dispute intake, oracle round trips, and the
//! weighted random pick of an arbitrator.
//!
//! ## Architecture
//!
//! One [`SelectionOrchestrator`] owns every per-trade selection record and
//! drives its state machine:
//! 1. **Request**: dispute opened, eligibility checked, randomness
//!    requested from the oracle, all atomically, so a rejected request
//!    leaves nothing behind
//! 2. **Resolution**: verified randomness (or the deterministic fallback)
//!    picks from the pool's *current* weight table and commits through the
//!    record's single assignment point
//! 3. **Fallback**: armed by oracle failure or the configured timeout;
//!    derives its randomness from the trade, the slot, and a digest of the
//!    weight table snapshot
//!
//! ## Oracle Boundary
//!
//! The oracle transport is behind the [`OracleClient`] trait; the
//! orchestrator only sees request handles and 32-byte payloads. Payload
//! verification ([`VrfPayload::verify`]) lives with the types, not here.
//!
//! [`VrfPayload::verify`]: openarbiter_types::VrfPayload::verify

pub mod fallback;
pub mod oracle;
pub mod orchestrator;

pub use fallback::derive_fallback_value;
pub use oracle::OracleClient;
pub use orchestrator::SelectionOrchestrator;

#[cfg(any(test, feature = "test-helpers"))]
pub use oracle::RecordingOracle;
