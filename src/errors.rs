//! Shared error definitions for the CEP-18 tokens of the suite.
use odra::prelude::*;

/// Errors raised by the asset and claim token contracts
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient balance for the operation
    InsufficientBalance = 500,

    /// Insufficient allowance for transfer_from
    InsufficientAllowance = 501,

    /// Mint/burn caller is not the vault ledger
    OnlyVaultAllowed = 502,

    /// Caller is not the token owner
    OnlyOwnerAllowed = 503,
}
