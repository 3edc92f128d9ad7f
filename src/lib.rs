#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared modules
pub mod errors;
pub mod events;
pub mod math;
pub mod token;

// Vault ledger: deposits, flash withdrawals, delegation orchestration
pub mod vault;

// Epoch-batched withdrawal queue
pub mod queue;

// Restaking adapter interface + reference adapter
pub mod adapters;

// Ratio feed oracle
pub mod oracle;
