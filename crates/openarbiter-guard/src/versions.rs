//! Expected-id / version table for deployed programs.
//!
//! The guard's own record of what is deployed at each slot: the program id
//! it expects and a strictly-increasing version number. Written only
//! through the authority-gated upgrade path; read on every validation and
//! compared against the Hub Registry's current answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use openarbiter_types::{ArbiterError, ProgramId, ProgramSlot, Result};

/// One slot's recorded deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// The program id the guard expects at this slot.
    pub program_id: ProgramId,
    /// Deployment version. Strictly increases across upgrades.
    pub version: u32,
    /// When the entry was last written.
    pub recorded_at: DateTime<Utc>,
}

/// Per-slot deployment table.
///
/// Starts empty: a slot without an entry imposes no constraint beyond the
/// registry's. Once an upgrade is recorded, the entry must agree with the
/// registry for calls on that slot to pass.
#[derive(Debug, Default)]
pub struct ProgramVersionTable {
    entries: BTreeMap<ProgramSlot, VersionEntry>,
}

impl ProgramVersionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records a deployment for `slot`. The first record for a slot
    /// accepts any version; after that the version must strictly increase.
    ///
    /// # Errors
    /// Returns [`ArbiterError::UpgradeRegression`] if `version` does not
    /// exceed the recorded one. The existing entry is left untouched.
    pub fn record_upgrade(
        &mut self,
        slot: ProgramSlot,
        program_id: ProgramId,
        version: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(existing) = self.entries.get(&slot) {
            if version <= existing.version {
                return Err(ArbiterError::UpgradeRegression {
                    slot,
                    current: existing.version,
                    proposed: version,
                });
            }
        }
        self.entries.insert(
            slot,
            VersionEntry {
                program_id,
                version,
                recorded_at: now,
            },
        );
        Ok(())
    }

    /// The recorded deployment for `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: ProgramSlot) -> Option<&VersionEntry> {
        self.entries.get(&slot)
    }

    /// The recorded version for `slot`, if any.
    #[must_use]
    pub fn version(&self, slot: ProgramSlot) -> Option<u32> {
        self.entries.get(&slot).map(|entry| entry.version)
    }

    /// Number of slots with a recorded deployment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no deployment was ever recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
