//! Verifiable randomness primitives for arbitrator selection.
//!
//! A dispute's randomness comes from an external oracle. The oracle proves
//! its output: the proof is an ed25519 signature over the canonical request
//! message, and the delivered value must equal SHA-256 of that proof. A
//! party that can predict or grind the value can steer arbitrator
//! selection, so payloads from sources registered with an authority key are
//! rejected unless the proof verifies.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, ArbiterError, OracleRequestId, TradeId};

/// Where a dispute's randomness comes from.
///
/// Sources registered with the oracle's ed25519 authority key get full
/// proof verification on every callback. Sources without one are accepted
/// as-is (oracles that prove on-chain before their adapter forwards the
/// payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessSource {
    /// The oracle account funding and answering requests.
    pub account: AccountId,
    /// The oracle's ed25519 verifying key, when callback proofs are
    /// checked locally.
    pub authority_key: Option<[u8; 32]>,
}

impl RandomnessSource {
    /// A source whose callbacks are verified against `authority_key`.
    #[must_use]
    pub fn verified(account: AccountId, authority_key: [u8; 32]) -> Self {
        Self {
            account,
            authority_key: Some(authority_key),
        }
    }

    /// A source whose callbacks are accepted without local verification.
    #[must_use]
    pub fn unverified(account: AccountId) -> Self {
        Self {
            account,
            authority_key: None,
        }
    }

    /// Whether callbacks from this source are verified locally.
    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.authority_key.is_some()
    }
}

/// The randomness payload an oracle delivers for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrfPayload {
    /// The 32-byte random value. Must equal SHA-256 of `proof` for
    /// verifying sources.
    pub value: [u8; 32],
    /// Ed25519 signature (64 bytes) over the canonical request message.
    pub proof: Vec<u8>,
}

impl VrfPayload {
    /// Canonical message the oracle signs for one request.
    ///
    /// Format: `"openarbiter:vrf:v1:" || trade_id || request_id || account`
    #[must_use]
    pub fn request_message(
        trade_id: TradeId,
        request_id: OracleRequestId,
        account: AccountId,
    ) -> Vec<u8> {
        let mut msg = Vec::with_capacity(83);
        msg.extend_from_slice(b"openarbiter:vrf:v1:");
        msg.extend_from_slice(trade_id.0.as_bytes());
        msg.extend_from_slice(request_id.0.as_bytes());
        msg.extend_from_slice(&account.0);
        msg
    }

    /// Verifies this payload against its source.
    ///
    /// For verifying sources, checks that `proof` is a valid signature by
    /// the source authority over the canonical request message, and that
    /// `value == SHA-256(proof)`. Non-verifying sources accept any payload.
    ///
    /// # Errors
    /// Returns `RandomnessInvalid` on any verification failure. The caller
    /// must leave the selection record unchanged in that case.
    pub fn verify(
        &self,
        source: &RandomnessSource,
        trade_id: TradeId,
        request_id: OracleRequestId,
    ) -> crate::Result<()> {
        let Some(authority) = source.authority_key else {
            return Ok(());
        };
        let key = VerifyingKey::from_bytes(&authority).map_err(|e| {
            ArbiterError::RandomnessInvalid {
                reason: format!("Bad oracle authority key: {e}"),
            }
        })?;
        let signature =
            Signature::from_slice(&self.proof).map_err(|e| ArbiterError::RandomnessInvalid {
                reason: format!("Malformed proof: {e}"),
            })?;
        let message = Self::request_message(trade_id, request_id, source.account);
        key.verify_strict(&message, &signature)
            .map_err(|_| ArbiterError::RandomnessInvalid {
                reason: format!("Proof does not verify for trade {trade_id}"),
            })?;

        let digest: [u8; 32] = Sha256::digest(&self.proof).into();
        if digest != self.value {
            return Err(ArbiterError::RandomnessInvalid {
                reason: format!("Value is not SHA-256 of proof for trade {trade_id}"),
            });
        }
        Ok(())
    }

    /// Produces a valid payload for a request. Used by oracle adapters
    /// and tests; the core only ever verifies.
    #[must_use]
    pub fn generate(
        signing_key: &SigningKey,
        trade_id: TradeId,
        request_id: OracleRequestId,
        account: AccountId,
    ) -> Self {
        let message = Self::request_message(trade_id, request_id, account);
        let proof = signing_key.sign(&message).to_bytes().to_vec();
        let value: [u8; 32] = Sha256::digest(&proof).into();
        Self { value, proof }
    }
}

/// Widens a 32-byte randomness value to the integer used for weighted
/// selection: the first 16 bytes, little-endian.
#[must_use]
pub fn randomness_to_u128(value: &[u8; 32]) -> u128 {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&value[..16]);
    u128::from_le_bytes(bytes)
}
