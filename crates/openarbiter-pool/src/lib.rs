//! # openarbiter-pool
//!
//! **Arbitrator Pool Plane**: registration, reputation tracking, and
//! per-currency selection weights.
//!
//! ## Architecture
//!
//! One [`ArbitratorPoolManager`] owns every arbitrator record and the
//! per-currency membership indexes:
//! 1. **Registration** is self-service and idempotent across lifetimes;
//!    leaving and rejoining reactivates the same record, history intact
//! 2. **Reputation** moves only through the settlement authority's
//!    `record_outcome` path
//! 3. **Weights** are derived lazily at selection time via
//!    [`WeightTable`]; nothing is cached between selections
//!
//! ## Selection Flow
//!
//! ```text
//! Orchestrator → weight_table(currency) → WeightTable.select(randomness)
//!             → case_opened(winner)
//! ```
//!
//! A zero weight and absence from the table are the same thing: inactive,
//! saturated, and unlisted arbitrators never appear.

pub mod manager;
pub mod weight;

pub use manager::ArbitratorPoolManager;
pub use weight::{WeightTable, weight_of};
