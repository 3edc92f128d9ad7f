//! Shared CEP-18 event definitions.
use odra::prelude::*;
use odra::casper_types::U256;

/// Emitted on every token transfer, mint (from the token contract itself)
/// and burn (to the token contract itself)
#[odra::event]
pub struct Transfer {
    /// Sender address
    pub from: Address,
    /// Recipient address
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// Emitted when an allowance is set
#[odra::event]
pub struct Approval {
    /// Owner address
    pub owner: Address,
    /// Spender address
    pub spender: Address,
    /// Amount approved
    pub value: U256,
}
