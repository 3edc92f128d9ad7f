//! Error definitions for restaking adapters.
use odra::prelude::*;

/// Errors raised by the reference adapter
#[odra::odra_error]
pub enum AdapterError {
    /// Caller is neither the vault ledger nor the trustee manager
    NotVaultOrTrusteeManager = 300,

    /// Zero amount
    ValueZero = 301,

    /// Undelegation exceeds the principal delegated to the target
    InsufficientDelegated = 302,

    /// Withdrawal ticket exists but its unlock time has not passed
    WithdrawalNotUnlocked = 303,

    /// A withdrawal ticket for this target is already outstanding
    PendingWithdrawalExists = 304,

    /// No ticket to claim for this target
    NothingToClaim = 305,

    /// The outstanding ticket is an emergency ticket; use the emergency path
    OnlyEmergencyClaimAllowed = 306,

    /// Adapter is paused
    AdapterPaused = 307,

    /// Reported slash exceeds the adapter's book for the target
    SlashExceedsDelegated = 308,
}
