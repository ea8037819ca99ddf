//! Selection weight computation.
//!
//! Weights are derived lazily from pool records at selection time and are
//! never cached durably; a record change (deactivation, a case opening,
//! an outcome landing) is reflected by the very next table build.
//!
//! All arithmetic is integer basis points, so every node computing a
//! weight table over the same records gets byte-identical results.

use openarbiter_types::constants::BASE_WEIGHT_BPS;
use openarbiter_types::{ArbitratorId, ArbitratorRecord, FiatCurrency};

/// Selection weight for one arbitrator in one currency's pool.
///
/// Returns 0 exactly when the arbitrator is ineligible: inactive, at
/// their concurrency cap, or not listing `currency`. Eligible arbitrators
/// always get a strictly positive weight, so exclusion from the table is
/// equivalent to weight 0.
///
/// ```text
/// win_ratio = cases_won * 10_000 / cases_handled     (0 with no history)
/// quality   = BASE_WEIGHT_BPS + reputation + win_ratio
/// weight    = max(quality * (cap - open) / cap, 1)
/// ```
#[must_use]
pub fn weight_of(rec: &ArbitratorRecord, currency: &FiatCurrency) -> u64 {
    if !rec.is_active() || rec.at_capacity() || !rec.supports(currency) {
        return 0;
    }
    let quality = BASE_WEIGHT_BPS + rec.reputation_bps + rec.win_ratio_bps();
    // at_capacity() returned false, so open_cases < max_case_load and
    // both headroom and cap are at least 1.
    let headroom = u64::from(rec.max_case_load - rec.open_cases);
    let cap = u64::from(rec.max_case_load);
    (quality * headroom / cap).max(1)
}

/// Cumulative-weight table over one currency's eligible arbitrators.
///
/// Entry order follows the input record order; the pool manager supplies
/// records in identity order, so the table is deterministic for a given
/// pool state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    /// `(identity, cumulative weight)`; cumulative values are strictly
    /// increasing and the last equals `total`.
    entries: Vec<(ArbitratorId, u64)>,
    total: u64,
}

impl WeightTable {
    /// Builds the table, excluding zero-weight members entirely.
    #[must_use]
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a ArbitratorRecord>,
        currency: &FiatCurrency,
    ) -> Self {
        let mut entries = Vec::new();
        let mut total = 0u64;
        for rec in records {
            let weight = weight_of(rec, currency);
            if weight == 0 {
                continue;
            }
            total += weight;
            entries.push((rec.id, total));
        }
        Self { entries, total }
    }

    /// Number of eligible arbitrators in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no arbitrator is eligible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights in the table.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Iterates `(identity, cumulative weight)` pairs in table order.
    /// Fallback derivation hashes these to bind its output to the exact
    /// pool snapshot it selected from.
    pub fn iter(&self) -> impl Iterator<Item = (ArbitratorId, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Maps a randomness value to the selected arbitrator.
    ///
    /// The value modulo the total weight lands in exactly one cumulative
    /// range: the first entry whose cumulative weight exceeds it wins.
    /// Returns `None` on an empty table.
    #[must_use]
    pub fn select(&self, randomness: u128) -> Option<ArbitratorId> {
        if self.entries.is_empty() {
            return None;
        }
        let r = randomness % u128::from(self.total);
        let idx = self
            .entries
            .partition_point(|&(_, cumulative)| u128::from(cumulative) <= r);
        self.entries.get(idx).map(|&(id, _)| id)
    }
}

#[cfg(test)]
impl WeightTable {
    /// Builds a table directly from `(identity, weight)` pairs, bypassing
    /// the record-derived formula. Unit tests of the selection rule only.
    fn from_weights(weights: &[(ArbitratorId, u64)]) -> Self {
        let mut entries = Vec::new();
        let mut total = 0u64;
        for &(id, weight) in weights {
            assert!(weight > 0, "zero weights never enter a table");
            total += weight;
            entries.push((id, total));
        }
        Self { entries, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use openarbiter_types::DisputeOutcome;
    use openarbiter_types::constants::DEFAULT_MAX_CASE_LOAD;

    fn usd() -> FiatCurrency {
        FiatCurrency::new("USD")
    }

    fn fresh(seed: u8) -> ArbitratorRecord {
        ArbitratorRecord::dummy(seed)
    }

    // ──────────────────── weight_of ────────────────────

    #[test]
    fn fresh_arbitrator_gets_base_weight() {
        let rec = fresh(1);
        assert_eq!(weight_of(&rec, &usd()), BASE_WEIGHT_BPS);
    }

    #[test]
    fn inactive_weighs_zero() {
        let mut rec = fresh(1);
        rec.status = openarbiter_types::ArbitratorStatus::Inactive;
        assert_eq!(weight_of(&rec, &usd()), 0);
    }

    #[test]
    fn at_capacity_weighs_zero() {
        let mut rec = fresh(1);
        for _ in 0..rec.max_case_load {
            rec.open_case(Utc::now());
        }
        assert_eq!(weight_of(&rec, &usd()), 0);
    }

    #[test]
    fn unlisted_currency_weighs_zero() {
        let rec = fresh(1);
        assert_eq!(weight_of(&rec, &FiatCurrency::new("EUR")), 0);
    }

    #[test]
    fn reputation_and_wins_raise_weight() {
        let mut veteran = fresh(1);
        for _ in 0..10 {
            veteran.open_case(Utc::now());
            veteran.apply_outcome(DisputeOutcome::Upheld, Utc::now());
        }
        let rookie = fresh(2);
        assert!(weight_of(&veteran, &usd()) > weight_of(&rookie, &usd()));
    }

    #[test]
    fn open_cases_lower_weight() {
        let idle = fresh(1);
        let mut busy = fresh(2);
        busy.open_case(Utc::now());
        assert!(weight_of(&busy, &usd()) < weight_of(&idle, &usd()));
        assert!(weight_of(&busy, &usd()) > 0);
    }

    #[test]
    fn eligible_weight_never_rounds_to_zero() {
        // One slot of headroom out of a huge cap still weighs at least 1.
        let mut rec = fresh(1);
        rec.max_case_load = 1_000_000;
        rec.open_cases = 999_999;
        assert_eq!(weight_of(&rec, &usd()), 1);
    }

    #[test]
    fn weight_matches_formula() {
        let mut rec = fresh(1);
        for i in 0..4 {
            rec.open_case(Utc::now());
            let outcome = if i < 3 {
                DisputeOutcome::Upheld
            } else {
                DisputeOutcome::Overturned
            };
            rec.apply_outcome(outcome, Utc::now());
        }
        rec.open_case(Utc::now());

        // reputation = 3*250 - 500 = 250; win_ratio = 7_500
        let quality = BASE_WEIGHT_BPS + 250 + 7_500;
        let cap = u64::from(DEFAULT_MAX_CASE_LOAD);
        let expected = quality * (cap - 1) / cap;
        assert_eq!(weight_of(&rec, &usd()), expected);
    }

    // ──────────────────── WeightTable ────────────────────

    #[test]
    fn build_excludes_zero_weight_members() {
        let active = fresh(1);
        let mut inactive = fresh(2);
        inactive.status = openarbiter_types::ArbitratorStatus::Inactive;
        let mut saturated = fresh(3);
        for _ in 0..saturated.max_case_load {
            saturated.open_case(Utc::now());
        }

        let table = WeightTable::build([&active, &inactive, &saturated], &usd());
        assert_eq!(table.len(), 1);
        assert_eq!(table.total_weight(), BASE_WEIGHT_BPS);
        assert_eq!(table.select(0), Some(active.id));
    }

    #[test]
    fn empty_table_selects_nothing() {
        let table = WeightTable::build([], &usd());
        assert!(table.is_empty());
        assert_eq!(table.select(12345), None);
    }

    #[test]
    fn boundary_three_to_one() {
        // Weights {A: 3, B: 1}: values 0,1,2 land in A's range, 3 in B's.
        let a = ArbitratorId([0xAA; 32]);
        let b = ArbitratorId([0xBB; 32]);
        let table = WeightTable::from_weights(&[(a, 3), (b, 1)]);

        assert_eq!(table.select(0), Some(a));
        assert_eq!(table.select(1), Some(a));
        assert_eq!(table.select(2), Some(a), "boundary: last value in A");
        assert_eq!(table.select(3), Some(b), "boundary: first value in B");
        // Wraps modulo total.
        assert_eq!(table.select(4), Some(a));
        assert_eq!(table.select(7), Some(b));
    }

    #[test]
    fn boundary_from_real_records() {
        // Records crafted so the formula yields exactly {A: 3, B: 1}:
        // fresh records have quality 10_000; with cap 10_000 the weight
        // equals the headroom.
        let mut a = fresh(0xA1);
        a.max_case_load = 10_000;
        a.open_cases = 9_997;
        let mut b = fresh(0xB1);
        b.max_case_load = 10_000;
        b.open_cases = 9_999;

        let table = WeightTable::build([&a, &b], &usd());
        assert_eq!(table.total_weight(), 4);
        assert_eq!(table.select(2), Some(a.id));
        assert_eq!(table.select(3), Some(b.id));
    }

    #[test]
    fn select_covers_full_modulus_range() {
        let a = ArbitratorId([1; 32]);
        let b = ArbitratorId([2; 32]);
        let c = ArbitratorId([3; 32]);
        let table = WeightTable::from_weights(&[(a, 5), (b, 2), (c, 3)]);

        let mut counts = [0u32; 3];
        for r in 0..10u128 {
            match table.select(r) {
                Some(id) if id == a => counts[0] += 1,
                Some(id) if id == b => counts[1] += 1,
                Some(id) if id == c => counts[2] += 1,
                other => panic!("unexpected selection {other:?}"),
            }
        }
        // One full cycle of the modulus hits each exactly `weight` times.
        assert_eq!(counts, [5, 2, 3]);
    }

    #[test]
    fn select_uses_low_128_bits_consistently() {
        let a = ArbitratorId([1; 32]);
        let b = ArbitratorId([2; 32]);
        let table = WeightTable::from_weights(&[(a, 3), (b, 1)]);
        assert_eq!(table.select(u128::MAX), table.select(u128::MAX % 4));
    }
}
