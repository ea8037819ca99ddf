//! Deterministic fallback randomness.
//!
//! When the oracle times out or reports failure, the dispute still needs
//! an arbitrator. The fallback derives a value every observer can
//! recompute: SHA-256 over a domain tag, the trade id, a recent slot
//! value, and a digest of the exact weight table being selected from.
//!
//! Binding the derivation to the table snapshot means two nodes that
//! disagree about pool state cannot silently agree on a winner — their
//! derived values differ, which surfaces the divergence instead of
//! masking it. The slot value keeps the output unpredictable at dispute
//! creation time: a party would need to control future slot values to
//! steer the fallback.

use sha2::{Digest, Sha256};

use openarbiter_pool::WeightTable;
use openarbiter_types::TradeId;

/// Derives the fallback randomness value for one dispute.
#[must_use]
pub fn derive_fallback_value(trade_id: TradeId, slot: u64, table: &WeightTable) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"openarbiter:fallback:v1:");
    hasher.update(trade_id.0.as_bytes());
    hasher.update(slot.to_le_bytes());
    for (id, cumulative) in table.iter() {
        hasher.update(id.0);
        hasher.update(cumulative.to_le_bytes());
    }
    hasher.finalize().into()
}
