//! Error types for the OpenArbiter dispute resolution core.
//!
//! All errors use the `OA_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Arbitrator pool errors
//! - 2xx: Selection errors
//! - 3xx: CPI guard errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{ArbitratorId, FiatCurrency, ProgramId, ProgramSlot, TradeId};

/// Central error enum for all OpenArbiter operations.
#[derive(Debug, Error)]
pub enum ArbiterError {
    // =================================================================
    // Arbitrator Pool Errors (1xx)
    // =================================================================
    /// The identity already has an active arbitrator record.
    #[error("OA_ERR_100: Arbitrator already registered: {0}")]
    AlreadyRegistered(ArbitratorId),

    /// No arbitrator record exists for this identity.
    #[error("OA_ERR_101: Arbitrator not found: {0}")]
    ArbitratorNotFound(ArbitratorId),

    /// The registration request failed validation (empty currency set, etc.).
    #[error("OA_ERR_102: Invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    // =================================================================
    // Selection Errors (2xx)
    // =================================================================
    /// An arbitrator has already been assigned to this trade.
    /// The assignment is immutable; no second write path exists.
    #[error("OA_ERR_200: Arbitrator already selected for trade: {0}")]
    AlreadySelected(TradeId),

    /// The requested state-machine transition is not valid from the
    /// record's current state.
    #[error("OA_ERR_201: Invalid selection state: {reason}")]
    InvalidState { reason: String },

    /// The currency's pool has no positive-weight members.
    #[error("OA_ERR_202: No eligible arbitrator for currency {currency}")]
    NoEligibleArbitrator { currency: FiatCurrency },

    /// No selection record exists for this trade.
    #[error("OA_ERR_203: Selection record not found for trade: {0}")]
    SelectionNotFound(TradeId),

    /// The randomness payload failed verification against its source.
    #[error("OA_ERR_204: Randomness rejected: {reason}")]
    RandomnessInvalid { reason: String },

    // =================================================================
    // CPI Guard Errors (3xx)
    // =================================================================
    /// The claimed target program id does not match the Hub Registry's
    /// currently-authorized id for the slot.
    #[error("OA_ERR_300: Invalid program id for slot {slot}: expected {expected}, got {actual}")]
    InvalidProgramId {
        slot: ProgramSlot,
        expected: ProgramId,
        actual: ProgramId,
    },

    /// The target account is not marked executable.
    #[error("OA_ERR_301: Program not executable: {0}")]
    ProgramNotExecutable(ProgramId),

    /// Performing this call would exceed the platform's CPI depth limit.
    #[error("OA_ERR_302: CPI depth exceeded: depth {depth} at limit {max}")]
    CpiDepthExceeded { depth: u8, max: u8 },

    /// The caller lacks rights for this privileged operation
    /// (`record_outcome`, `record_program_upgrade`).
    #[error("OA_ERR_303: Unauthorized: {reason}")]
    UnauthorizedCpi { reason: String },

    /// A recorded program upgrade must strictly increase the version.
    #[error(
        "OA_ERR_304: Upgrade regression for slot {slot}: \
         version {proposed} does not exceed recorded {current}"
    )]
    UpgradeRegression {
        slot: ProgramSlot,
        current: u32,
        proposed: u32,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OA_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("OA_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (missing registry slot, bad config values, etc.).
    #[error("OA_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("OA_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ArbiterError>;

// Conversion from std::io::Error
impl From<std::io::Error> for ArbiterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArbiterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
