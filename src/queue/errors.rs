//! Error definitions for the withdrawal queue.
use odra::prelude::*;

/// Errors raised by the WithdrawalQueue contract
#[odra::odra_error]
pub enum QueueError {
    /// Caller is not the vault ledger
    OnlyVaultAllowed = 200,

    /// Zero amount
    ValueZero = 201,

    /// Malformed parameters (mismatched arrays, duplicate obligations)
    NullParams = 202,

    /// Epoch id does not match the current epoch
    EpochMismatch = 203,

    /// Operation requires an open epoch
    EpochNotOpen = 204,

    /// Claims are only recorded while the epoch is undelegating
    EpochNotUndelegating = 205,

    /// The (adapter, target) pair is not an obligation of this epoch
    ClaimUnknownAdapter = 206,

    /// This obligation has already reported in
    ClaimAlreadyProcessed = 207,

    /// Nothing is settled for this receiver
    IsNotAbleToRedeem = 208,
}
