//! Event definitions for the withdrawal queue.
use odra::prelude::*;
use odra::casper_types::U256;

/// Emitted when the vault enqueues a withdrawal request
#[odra::event]
pub struct WithdrawalRequested {
    /// Receiver of the eventual payout
    pub receiver: Address,
    /// Epoch the request was recorded in
    pub epoch: u64,
    /// Asset amount fixed at request time
    pub amount: U256,
    /// Shares burned for the request
    pub shares: U256,
}

/// Emitted when an epoch's amounts are fixed and the next epoch opens
#[odra::event]
pub struct EpochUndelegated {
    /// The epoch that moved to undelegating
    pub epoch: u64,
    /// Total amount requested in the epoch
    pub requested_amount: U256,
    /// Portion covered directly from vault free balance
    pub covered_amount: U256,
    /// Number of adapter obligations to await
    pub obligations: u32,
}

/// Emitted when the last obligation reports in and the epoch settles
#[odra::event]
pub struct EpochSettled {
    /// The settled epoch
    pub epoch: u64,
    /// Amount reserved for the epoch's receivers
    pub settled_amount: U256,
    /// Over-delivery returned to the vault
    pub excess: U256,
}

/// Emitted when a receiver's settled entry is paid out
#[odra::event]
pub struct WithdrawalRedeemed {
    /// Paid receiver
    pub receiver: Address,
    /// Epoch the entry belonged to
    pub epoch: u64,
    /// Amount paid, after pro-rata slashing adjustment
    pub amount: U256,
}
