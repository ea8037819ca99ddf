//! # openarbiter-types
//!
//! Shared types, errors, and configuration for the **OpenArbiter** dispute
//! resolution core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`TradeId`], [`OracleRequestId`], [`ArbitratorId`], [`ProgramId`], [`AccountId`], [`FiatCurrency`]
//! - **Arbitrator model**: [`ArbitratorRecord`], [`ArbitratorStatus`], [`DisputeOutcome`]
//! - **Selection model**: [`SelectionRecord`], [`SelectionState`], [`SelectionMethod`]
//! - **Randomness model**: [`RandomnessSource`], [`VrfPayload`]
//! - **Audit model**: [`CpiAuditEntry`], [`CpiOutcome`]
//! - **Hub Registry**: [`RegistryView`], [`HubRegistry`], [`ProgramSlot`], [`TreasuryAddresses`]
//! - **Configuration**: [`ArbiterConfig`], [`PoolConfig`], [`SelectionConfig`], [`GuardConfig`]
//! - **Errors**: [`ArbiterError`] with `OA_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod arbitrator;
pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod randomness;
pub mod registry;
pub mod selection;

// Re-export all primary types at crate root for ergonomic imports:
//   use openarbiter_types::{ArbitratorRecord, SelectionRecord, ...};

pub use arbitrator::*;
pub use audit::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use randomness::*;
pub use registry::*;
pub use selection::*;

// Constants are accessed via `openarbiter_types::constants::FOO`
// (not re-exported to avoid name collisions).
