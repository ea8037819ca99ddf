//! # Hub Registry: the source of truth for program identities
//!
//! The hub maps each logical protocol role (trade, offer, escrow, ...) to
//! the program id currently authorized to fill it. The dispute core only
//! ever READS the registry; governance writes to it through its own path.
//!
//! ## Security Properties
//!
//! - **Read at call time**: the guard consults the registry on every
//!   validation, never a cached copy. A governance update takes effect on
//!   the very next call.
//! - **No caller influence**: expected ids come only from the registry;
//!   nothing a caller supplies can substitute its own target.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AccountId, ProgramId};

/// Logical roles the hub tracks. Each slot holds at most one authorized
/// program id at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProgramSlot {
    /// The trade state machine.
    Trade,
    /// The offer book.
    Offer,
    /// User profiles and reputation mirrors.
    Profile,
    /// The escrow vault holding disputed funds.
    Escrow,
    /// The price feed consumed at trade creation.
    PriceFeed,
}

impl ProgramSlot {
    /// All slots, in registry order.
    pub const ALL: [Self; 5] = [
        Self::Trade,
        Self::Offer,
        Self::Profile,
        Self::Escrow,
        Self::PriceFeed,
    ];
}

impl std::fmt::Display for ProgramSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trade => write!(f, "TRADE"),
            Self::Offer => write!(f, "OFFER"),
            Self::Profile => write!(f, "PROFILE"),
            Self::Escrow => write!(f, "ESCROW"),
            Self::PriceFeed => write!(f, "PRICE_FEED"),
        }
    }
}

/// Platform treasury addresses, read from the hub by fee-distribution
/// callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryAddresses {
    /// Main protocol treasury.
    pub treasury: AccountId,
    /// Trade-fee collector.
    pub fee_collector: AccountId,
}

/// Read-only view of the Hub Registry.
///
/// The guard and orchestrator take this as a parameter on every call, so
/// the expected ids are always the registry's CURRENT truth; a
/// process-wide cached copy would go stale across governance updates.
pub trait RegistryView {
    /// The program id currently authorized for `slot`, if any.
    fn authorized_program_id(&self, slot: ProgramSlot) -> Option<ProgramId>;

    /// Current treasury addresses.
    fn treasury_addresses(&self) -> TreasuryAddresses;
}

/// In-memory Hub Registry.
///
/// The mutators model the external governance path; the dispute core
/// itself only ever uses the [`RegistryView`] half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubRegistry {
    programs: BTreeMap<ProgramSlot, ProgramId>,
    treasury: TreasuryAddresses,
}

impl HubRegistry {
    /// Creates an empty registry with the given treasury addresses.
    #[must_use]
    pub fn new(treasury: TreasuryAddresses) -> Self {
        Self {
            programs: BTreeMap::new(),
            treasury,
        }
    }

    /// Governance path: authorizes `program` for `slot`, replacing any
    /// previous holder.
    pub fn set_program(&mut self, slot: ProgramSlot, program: ProgramId) {
        self.programs.insert(slot, program);
    }

    /// Governance path: removes the authorization for `slot`.
    pub fn clear_program(&mut self, slot: ProgramSlot) {
        self.programs.remove(&slot);
    }

    /// Governance path: replaces the treasury addresses.
    pub fn set_treasury(&mut self, treasury: TreasuryAddresses) {
        self.treasury = treasury;
    }

    /// Number of slots with an authorized program.
    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Returns `true` if no slot has an authorized program.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl RegistryView for HubRegistry {
    fn authorized_program_id(&self, slot: ProgramSlot) -> Option<ProgramId> {
        self.programs.get(&slot).copied()
    }

    fn treasury_addresses(&self) -> TreasuryAddresses {
        self.treasury
    }
}

/// Dummy registry for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl HubRegistry {
    /// Create a registry with all five slots populated with derived ids.
    #[must_use]
    pub fn dummy() -> Self {
        let mut registry = Self::new(TreasuryAddresses {
            treasury: AccountId([0xD0; 32]),
            fee_collector: AccountId([0xF0; 32]),
        });
        let mut seed = 1u8;
        for slot in ProgramSlot::ALL {
            registry.set_program(slot, ProgramId([seed; 32]));
            seed += 1;
        }
        registry
    }
}
