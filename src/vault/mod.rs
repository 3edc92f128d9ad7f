//! Vault ledger subsystem.
//!
//! The ledger is the accounting core: share/asset ratio, deposit bonus and
//! flash fee curves, adapter orchestration and withdrawal settlement. The
//! claim token is the CEP-18 share token the ledger mints and burns.

pub mod vault_ledger;
pub mod claim_token;
pub mod fee_curves;
pub mod errors;
pub mod events;


pub use vault_ledger::VaultLedger;
pub use claim_token::ClaimToken;
pub use fee_curves::{DepositBonusParams, FlashFeeParams};
pub use errors::VaultError;
