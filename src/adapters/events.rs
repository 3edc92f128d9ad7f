//! Event definitions for restaking adapters.
use odra::prelude::*;
use odra::casper_types::U256;

/// Emitted when principal is delegated to a target
#[odra::event]
pub struct Delegated {
    /// Delegation target
    pub target: Address,
    /// Amount delegated
    pub amount: U256,
}

/// Emitted when an undelegation ticket is queued
#[odra::event]
pub struct UndelegateQueued {
    /// Delegation target
    pub target: Address,
    /// Amount queued for withdrawal
    pub amount: U256,
    /// Timestamp at which the ticket unlocks
    pub unlock_at: u64,
}

/// Emitted when an unlocked ticket is claimed back to the vault
#[odra::event]
pub struct Claimed {
    /// Delegation target
    pub target: Address,
    /// Amount returned to the vault
    pub amount: U256,
}

/// Emitted when an emergency ticket is queued
#[odra::event]
pub struct EmergencyQueued {
    /// Delegation target
    pub target: Address,
    /// Amount queued out-of-band
    pub amount: U256,
    /// Timestamp at which the ticket unlocks
    pub unlock_at: u64,
}

/// Emitted when an emergency ticket is claimed back to the vault
#[odra::event]
pub struct EmergencyClaimed {
    /// Delegation target
    pub target: Address,
    /// Amount returned to the vault
    pub amount: U256,
}

/// Emitted when the trustee reports an externally applied slash
#[odra::event]
pub struct SlashReported {
    /// Slashed target
    pub target: Address,
    /// Principal removed from the book
    pub amount: U256,
}
