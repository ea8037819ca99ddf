//! # CPI Validation Guard
//!
//! Every privileged cross-program invocation passes through
//! [`CpiGuard::validate_and_invoke`]. The guard reads the Hub Registry at
//! call time, runs a fixed check order, audits the attempt, and only then
//! lets the invoker run.
//!
//! ## Check Order
//!
//! ```text
//! 1. registry entry exists for the slot          → Configuration
//!    (and agrees with any recorded upgrade)      → InvalidProgramId
//! 2. claimed target == registry's expected id    → InvalidProgramId
//! 3. target account is executable                → ProgramNotExecutable
//! 4. depth below MAX_CPI_DEPTH                   → CpiDepthExceeded
//! ```
//!
//! ## Security Properties
//!
//! - **Fail closed**: every rejection happens before the invocation; a
//!   rejected call moves no funds
//! - **Everything audited**: acceptances and rejections both append to the
//!   log before control leaves the guard
//! - **No caching**: the registry is read on every call, so a governance
//!   update is visible to the very next validation
//! - **Upgrade discipline**: deployment versions only move forward, and a
//!   recorded upgrade the registry has not caught up with fails the whole
//!   slot until governance syncs

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use openarbiter_types::{
    AccountId, ArbiterError, CpiAuditEntry, CpiOutcome, GuardConfig, ProgramId, ProgramSlot,
    RegistryView, Result,
};

use crate::audit_log::CpiAuditLog;
use crate::invoker::ProgramInvoker;
use crate::versions::ProgramVersionTable;

/// One attempted cross-program call, assembled by the caller.
///
/// The caller supplies its own depth counter and the claimed target; the
/// guard trusts neither — the target is checked against the registry and
/// the depth against the platform limit.
#[derive(Debug, Clone)]
pub struct CpiCall {
    /// The registry slot this call claims to invoke.
    pub slot: ProgramSlot,
    /// The program making the call.
    pub caller: ProgramId,
    /// The claimed target program id.
    pub target: ProgramId,
    /// Whether the target account is marked executable.
    pub target_executable: bool,
    /// The caller's current CPI depth (0 = top-level transaction).
    pub depth: u8,
    /// Opaque instruction payload. The guard never interprets it, only
    /// hashes it into the audit entry.
    pub instruction: Vec<u8>,
}

/// SHA-256 of the raw instruction payload — what the audit log stores in
/// place of the unbounded payload itself.
#[must_use]
pub fn instruction_digest(instruction: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(instruction);
    hasher.finalize().into()
}

/// The invocation gate. Owns the version table and the audit log; borrows
/// the registry fresh on every call.
#[derive(Debug)]
pub struct CpiGuard {
    versions: ProgramVersionTable,
    audit: CpiAuditLog,
    upgrade_authority: AccountId,
    config: GuardConfig,
}

impl CpiGuard {
    /// Creates a guard with an empty version table and audit log.
    #[must_use]
    pub fn new(upgrade_authority: AccountId, config: GuardConfig) -> Self {
        Self {
            versions: ProgramVersionTable::new(),
            audit: CpiAuditLog::new(),
            upgrade_authority,
            config,
        }
    }

    /// Validates `call` against the registry's current state and, if every
    /// check passes, performs it through `invoker`.
    ///
    /// The audit entry is appended BEFORE the invoker runs; an invoker
    /// error reaches the caller with the acceptance already recorded,
    /// since the entry documents the validation outcome, not the
    /// downstream program's.
    ///
    /// # Errors
    /// - `Configuration` if the registry has no entry for the slot
    /// - `InvalidProgramId` if a recorded upgrade disagrees with the
    ///   registry, or the claimed target does
    /// - `ProgramNotExecutable` / `CpiDepthExceeded` per the check order
    /// - any invoker error, propagated unchanged
    pub fn validate_and_invoke(
        &mut self,
        registry: &impl RegistryView,
        call: &CpiCall,
        invoker: &mut impl ProgramInvoker,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let digest = instruction_digest(&call.instruction);
        match self.validate(registry, call) {
            Ok(()) => {
                let seq = self.audit.append(CpiAuditEntry {
                    seq: 0,
                    slot: call.slot,
                    target: call.target,
                    caller: call.caller,
                    depth: call.depth,
                    instruction_digest: digest,
                    outcome: CpiOutcome::Accepted,
                    recorded_at: now,
                });
                tracing::debug!(
                    seq,
                    slot = %call.slot,
                    target = %call.target,
                    instruction = %hex::encode(&digest[..8]),
                    "CPI accepted"
                );
                invoker.invoke(call.target, &call.instruction)
            }
            Err(err) => {
                self.audit.append(CpiAuditEntry {
                    seq: 0,
                    slot: call.slot,
                    target: call.target,
                    caller: call.caller,
                    depth: call.depth,
                    instruction_digest: digest,
                    outcome: CpiOutcome::Rejected {
                        reason: err.to_string(),
                    },
                    recorded_at: now,
                });
                tracing::warn!(
                    slot = %call.slot,
                    target = %call.target,
                    error = %err,
                    "CPI rejected"
                );
                Err(err)
            }
        }
    }

    /// Records a program deployment for `slot`. Restricted to the upgrade
    /// authority; the version must strictly increase.
    ///
    /// Until governance updates the registry to match, every call on the
    /// slot fails the consistency check — a half-applied upgrade fails
    /// closed instead of letting calls reach the old deployment.
    ///
    /// # Errors
    /// Returns `UnauthorizedCpi` for any caller but the upgrade authority,
    /// `UpgradeRegression` if the version does not increase.
    pub fn record_program_upgrade(
        &mut self,
        caller: AccountId,
        slot: ProgramSlot,
        new_program_id: ProgramId,
        new_version: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if caller != self.upgrade_authority {
            return Err(ArbiterError::UnauthorizedCpi {
                reason: format!("{caller} is not the upgrade authority"),
            });
        }
        self.versions
            .record_upgrade(slot, new_program_id, new_version, now)?;
        tracing::info!(
            slot = %slot,
            program = %new_program_id,
            version = new_version,
            "Program upgrade recorded"
        );
        Ok(())
    }

    // ----------------------------------------------------------------
    // Read surface
    // ----------------------------------------------------------------

    /// The recorded deployment version for `slot`, if any upgrade was
    /// ever recorded.
    #[must_use]
    pub fn expected_version(&self, slot: ProgramSlot) -> Option<u32> {
        self.versions.version(slot)
    }

    /// The append-only audit log.
    #[must_use]
    pub fn audit(&self) -> &CpiAuditLog {
        &self.audit
    }

    /// Number of rejected attempts recorded.
    #[must_use]
    pub fn rejection_count(&self) -> u64 {
        self.audit.rejection_count()
    }

    // ----------------------------------------------------------------
    // Internals
    // ----------------------------------------------------------------

    /// The fixed check order. Pure with respect to the guard: mutation
    /// (audit append) is the caller's job, so a rejected call here has no
    /// side effects at all.
    fn validate(&self, registry: &impl RegistryView, call: &CpiCall) -> Result<()> {
        // 1. The expected id comes from the registry at call time.
        let registry_id = registry.authorized_program_id(call.slot).ok_or_else(|| {
            ArbiterError::Configuration(format!("No registry entry for slot {}", call.slot))
        })?;
        if let Some(entry) = self.versions.get(call.slot) {
            if entry.program_id != registry_id {
                return Err(ArbiterError::InvalidProgramId {
                    slot: call.slot,
                    expected: entry.program_id,
                    actual: registry_id,
                });
            }
        }
        // 2. The claimed target must match it.
        if call.target != registry_id {
            return Err(ArbiterError::InvalidProgramId {
                slot: call.slot,
                expected: registry_id,
                actual: call.target,
            });
        }
        // 3. Executability.
        if !call.target_executable {
            return Err(ArbiterError::ProgramNotExecutable(call.target));
        }
        // 4. Depth limit.
        if call.depth >= self.config.max_cpi_depth {
            return Err(ArbiterError::CpiDepthExceeded {
                depth: call.depth,
                max: self.config.max_cpi_depth,
            });
        }
        Ok(())
    }
}
