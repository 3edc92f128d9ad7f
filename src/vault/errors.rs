//! Error definitions for the vault ledger.
use odra::prelude::*;

/// Errors raised by the VaultLedger contract
#[odra::odra_error]
pub enum VaultError {
    /// Zero amount
    ValueZero = 100,

    /// Amount below the configured minimum
    LowerMinAmount = 101,

    /// Malformed parameters (mismatched arrays)
    NullParams = 102,

    /// Address is not usable in this position
    InvalidAddress = 103,

    /// A configured rate or kink is out of bounds
    ParameterExceedsLimits = 104,

    /// Free balance or flash capacity cannot cover the amount
    InsufficientCapacity = 105,

    /// Caller is not the owner
    OnlyOwnerAllowed = 106,

    /// Caller is not the operator
    OnlyOperatorAllowed = 107,

    /// Undelegate was called with a stale epoch id
    UndelegateEpochMismatch = 108,

    /// Adapter is not registered
    AdapterNotRegistered = 109,

    /// Adapter is already registered
    AdapterAlreadyRegistered = 110,

    /// Flash withdrawal output fell below the caller's minimum
    ExceedsMaxSlippage = 111,

    /// Contract is paused
    ContractPaused = 112,
}
