//! # openarbiter-guard
//!
//! **Validation Plane**: the gate in front of every privileged
//! cross-program invocation.
//!
//! ## Architecture
//!
//! A [`CpiGuard`] sits between the dispute core's callers (settlement,
//! refund, payout) and the host platform's invocation machinery:
//! 1. Reads the Hub Registry at call time for the slot's expected program
//!    id — never cached, never caller-supplied
//! 2. Runs a fixed check order (identity, executability, depth) and
//!    rejects fail-closed: a rejected call never reaches the invoker
//! 3. Appends every attempt to an append-only chunked audit log before
//!    control leaves the guard
//! 4. Tracks program deployments in a strictly-monotonic version table,
//!    updated only by the upgrade authority
//!
//! ## Failure Semantics
//!
//! Strict and non-recoverable at this layer: the guard never retries, and
//! a registry/version-table disagreement fails the whole slot until
//! governance syncs the registry.

pub mod audit_log;
pub mod guard;
pub mod invoker;
pub mod versions;

pub use audit_log::CpiAuditLog;
pub use guard::{CpiCall, CpiGuard, instruction_digest};
pub use invoker::ProgramInvoker;
pub use versions::{ProgramVersionTable, VersionEntry};

#[cfg(any(test, feature = "test-helpers"))]
pub use invoker::RecordingInvoker;
