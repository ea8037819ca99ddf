//! # Arbitrator Pool Manager
//!
//! Owns every arbitrator record and the per-currency membership indexes.
//! Registration is self-service; reputation moves only through the
//! settlement authority's `record_outcome` path.
//!
//! ## Security Properties
//!
//! - **History is permanent**: records are deactivated, never deleted, and
//!   re-registration reactivates the existing record, so an arbitrator
//!   cannot shed a bad reputation by leaving and rejoining
//! - **Authority-gated reputation**: only the settlement authority the
//!   manager was constructed with may record outcomes
//! - **No partial state**: every mutating operation validates before it
//!   writes; a rejected call leaves the pool exactly as it found it

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use openarbiter_types::{
    AccountId, ArbiterError, ArbitratorId, ArbitratorRecord, ArbitratorStatus, DisputeOutcome,
    FiatCurrency, PoolConfig, Result,
};

use crate::weight::{WeightTable, weight_of};

/// The arbitrator pool: records plus per-currency membership indexes.
///
/// Membership indexes track REGISTERED currencies regardless of status;
/// eligibility (active, under cap) is evaluated at weight time, so a
/// deactivation is visible to the very next selection without any index
/// maintenance.
#[derive(Debug)]
pub struct ArbitratorPoolManager {
    /// All records ever registered, by identity. Never shrinks.
    records: BTreeMap<ArbitratorId, ArbitratorRecord>,
    /// Per-currency membership, in identity order.
    pools: BTreeMap<FiatCurrency, BTreeSet<ArbitratorId>>,
    /// The only identity allowed to record dispute outcomes.
    settlement_authority: AccountId,
    config: PoolConfig,
}

impl ArbitratorPoolManager {
    /// Creates an empty pool manager.
    #[must_use]
    pub fn new(settlement_authority: AccountId, config: PoolConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            pools: BTreeMap::new(),
            settlement_authority,
            config,
        }
    }

    /// Self-service registration. The caller IS the identity being
    /// registered; there is no path to register someone else.
    ///
    /// A first-time registration creates a record with zeroed counters. If
    /// an inactive record exists, it is reactivated in place: currencies
    /// and encryption key are replaced, reputation and counters are
    /// preserved.
    ///
    /// # Errors
    /// - `InvalidRegistration` on an empty or oversized currency set
    /// - `AlreadyRegistered` if the identity has an active record
    pub fn register(
        &mut self,
        caller: ArbitratorId,
        currencies: BTreeSet<FiatCurrency>,
        encryption_key: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<()> {
        if currencies.is_empty() {
            return Err(ArbiterError::InvalidRegistration {
                reason: "Currency set is empty".into(),
            });
        }
        if currencies.len() > self.config.max_supported_currencies {
            return Err(ArbiterError::InvalidRegistration {
                reason: format!(
                    "Currency set has {} entries (limit: {})",
                    currencies.len(),
                    self.config.max_supported_currencies
                ),
            });
        }

        if let Some(existing) = self.records.get_mut(&caller) {
            if existing.is_active() {
                return Err(ArbiterError::AlreadyRegistered(caller));
            }
            // Reactivation: swap out the currency listing, keep history.
            let old_currencies = std::mem::replace(
                &mut existing.supported_currencies,
                currencies.clone(),
            );
            existing.status = ArbitratorStatus::Active;
            existing.encryption_key = encryption_key;
            existing.updated_at = now;
            for currency in &old_currencies {
                if let Some(pool) = self.pools.get_mut(currency) {
                    pool.remove(&caller);
                }
            }
            for currency in &currencies {
                self.pools.entry(currency.clone()).or_default().insert(caller);
            }
            tracing::info!(
                arbitrator = %caller,
                currencies = currencies.len(),
                "Arbitrator reactivated"
            );
            return Ok(());
        }

        let record = ArbitratorRecord::new(
            caller,
            currencies.clone(),
            encryption_key,
            self.config.default_max_case_load,
            now,
        );
        self.records.insert(caller, record);
        for currency in &currencies {
            self.pools.entry(currency.clone()).or_default().insert(caller);
        }
        tracing::info!(
            arbitrator = %caller,
            currencies = currencies.len(),
            "Arbitrator registered"
        );
        Ok(())
    }

    /// Withdraws an arbitrator from selection. Open cases stay open and
    /// history is retained; the next weight computation sees weight 0.
    /// Deactivating an already-inactive arbitrator is a no-op.
    ///
    /// # Errors
    /// - `UnauthorizedCpi` unless `caller == identity`
    /// - `ArbitratorNotFound` for unknown identities
    pub fn deactivate(
        &mut self,
        caller: ArbitratorId,
        identity: ArbitratorId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if caller != identity {
            return Err(ArbiterError::UnauthorizedCpi {
                reason: format!("{caller} cannot deactivate {identity}"),
            });
        }
        let record = self
            .records
            .get_mut(&identity)
            .ok_or(ArbiterError::ArbitratorNotFound(identity))?;
        if record.is_active() {
            record.status = ArbitratorStatus::Inactive;
            record.updated_at = now;
            tracing::info!(arbitrator = %identity, "Arbitrator deactivated");
        }
        Ok(())
    }

    /// Records a resolved dispute for an arbitrator: closes their open
    /// case, bumps the counters, and adjusts reputation. This is the ONLY
    /// path that mutates reputation.
    ///
    /// # Errors
    /// - `UnauthorizedCpi` unless `authority` is the settlement authority
    /// - `ArbitratorNotFound` for unknown identities
    pub fn record_outcome(
        &mut self,
        authority: AccountId,
        identity: ArbitratorId,
        outcome: DisputeOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if authority != self.settlement_authority {
            return Err(ArbiterError::UnauthorizedCpi {
                reason: format!("{authority} is not the settlement authority"),
            });
        }
        let record = self
            .records
            .get_mut(&identity)
            .ok_or(ArbiterError::ArbitratorNotFound(identity))?;
        record.apply_outcome(outcome, now);
        tracing::debug!(
            arbitrator = %identity,
            outcome = ?outcome,
            reputation_bps = record.reputation_bps,
            "Dispute outcome recorded"
        );
        Ok(())
    }

    /// Bumps an arbitrator's open-case count. Called by the selection
    /// orchestrator at the single assignment point.
    ///
    /// # Errors
    /// Returns `ArbitratorNotFound` for unknown identities.
    pub fn case_opened(&mut self, identity: ArbitratorId, now: DateTime<Utc>) -> Result<()> {
        let record = self
            .records
            .get_mut(&identity)
            .ok_or(ArbiterError::ArbitratorNotFound(identity))?;
        record.open_case(now);
        Ok(())
    }

    /// Selection weight of one arbitrator for one currency. Zero for
    /// unknown identities and every ineligible record.
    #[must_use]
    pub fn weight_of(&self, identity: ArbitratorId, currency: &FiatCurrency) -> u64 {
        self.records
            .get(&identity)
            .map_or(0, |rec| weight_of(rec, currency))
    }

    /// Builds the cumulative-weight table over the currency's eligible
    /// members, in identity order.
    #[must_use]
    pub fn weight_table(&self, currency: &FiatCurrency) -> WeightTable {
        let members = self
            .pools
            .get(currency)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id));
        WeightTable::build(members, currency)
    }

    /// Looks up a record by identity.
    #[must_use]
    pub fn get(&self, identity: ArbitratorId) -> Option<&ArbitratorRecord> {
        self.records.get(&identity)
    }

    /// Total records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no arbitrator has ever registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of currently active arbitrators.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.records.values().filter(|r| r.is_active()).count()
    }

    /// Currencies with at least one registered member, in order.
    pub fn currencies(&self) -> impl Iterator<Item = &FiatCurrency> {
        self.pools
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(currency, _)| currency)
    }
}
