//! System-wide constants for the OpenArbiter dispute resolution core.

/// Engine name used in logs and version strings.
pub const ENGINE_NAME: &str = "OpenArbiter";

/// Engine version, from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =================================================================
// CPI guard limits
// =================================================================

/// Maximum cross-program invocation depth the platform permits.
///
/// A call arriving at depth `MAX_CPI_DEPTH` or deeper is rejected:
/// performing it would push the stack past the platform limit.
pub const MAX_CPI_DEPTH: u8 = 4;

// =================================================================
// Selection timing
// =================================================================

/// Default time a dispute waits on the randomness oracle before the
/// deterministic fallback path becomes armable, in milliseconds.
pub const DEFAULT_FALLBACK_TIMEOUT_MS: u64 = 30_000;

// =================================================================
// Arbitrator pool defaults
// =================================================================

/// Default maximum number of concurrently open cases per arbitrator.
pub const DEFAULT_MAX_CASE_LOAD: u32 = 5;

/// Maximum number of fiat currencies a single arbitrator may list.
pub const MAX_SUPPORTED_CURRENCIES: usize = 16;

// =================================================================
// Weight formula (basis points)
// =================================================================

/// Base weight every eligible arbitrator starts from, in basis points.
pub const BASE_WEIGHT_BPS: u64 = 10_000;

/// Reputation ceiling, in basis points.
pub const MAX_REPUTATION_BPS: u64 = 10_000;

/// Reputation gained per won dispute, in basis points.
pub const REPUTATION_GAIN_PER_WIN: u64 = 250;

/// Reputation lost per lost dispute, in basis points.
pub const REPUTATION_LOSS_PER_LOSS: u64 = 500;

// =================================================================
// Audit log
// =================================================================

/// Entries per audit-log chunk. Chunks are never reallocated once full,
/// so references into sealed chunks stay valid for the log's lifetime.
pub const AUDIT_CHUNK_SIZE: usize = 1024;
