//! Epoch-batched withdrawal queue.
//!
//! Withdrawal requests accumulate in the open epoch; undelegation fixes the
//! epoch's amounts and opens the next one; the epoch becomes redeemable once
//! every adapter obligation has reported in. Slashing that lands between
//! undelegation and claim is socialized pro-rata across the epoch's
//! receivers.

pub mod withdrawal_queue;
pub mod errors;
pub mod events;

#[cfg(test)]
mod tests;

pub use withdrawal_queue::{WithdrawalQueue, EpochState, EpochInfo, PendingWithdrawal};
pub use errors::QueueError;
