//! Configuration types for the dispute resolution core.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;

/// Configuration for the arbitrator pool manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Case cap applied to newly registered arbitrators.
    pub default_max_case_load: u32,
    /// Upper bound on currencies one arbitrator may list.
    pub max_supported_currencies: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_max_case_load: constants::DEFAULT_MAX_CASE_LOAD,
            max_supported_currencies: constants::MAX_SUPPORTED_CURRENCIES,
        }
    }
}

/// Configuration for the selection orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// How long a dispute waits on the oracle before the deterministic
    /// fallback becomes armable, in milliseconds.
    pub fallback_timeout_ms: u64,
}

impl SelectionConfig {
    /// The fallback timeout as a [`Duration`].
    #[must_use]
    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            fallback_timeout_ms: constants::DEFAULT_FALLBACK_TIMEOUT_MS,
        }
    }
}

/// Configuration for the CPI guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Maximum cross-program invocation depth.
    pub max_cpi_depth: u8,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_cpi_depth: constants::MAX_CPI_DEPTH,
        }
    }
}

/// Top-level configuration for one dispute core instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// Pool manager settings.
    pub pool: PoolConfig,
    /// Selection orchestrator settings.
    pub selection: SelectionConfig,
    /// CPI guard settings.
    pub guard: GuardConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_constants() {
        let cfg = ArbiterConfig::default();
        assert_eq!(
            cfg.pool.default_max_case_load,
            constants::DEFAULT_MAX_CASE_LOAD
        );
        assert_eq!(
            cfg.selection.fallback_timeout_ms,
            constants::DEFAULT_FALLBACK_TIMEOUT_MS
        );
        assert_eq!(cfg.guard.max_cpi_depth, constants::MAX_CPI_DEPTH);
    }

    #[test]
    fn fallback_timeout_conversion() {
        let cfg = SelectionConfig {
            fallback_timeout_ms: 1_500,
        };
        assert_eq!(cfg.fallback_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ArbiterConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ArbiterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.guard.max_cpi_depth, cfg.guard.max_cpi_depth);
        assert_eq!(
            back.selection.fallback_timeout_ms,
            cfg.selection.fallback_timeout_ms
        );
    }
}
