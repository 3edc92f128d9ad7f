//! Restaking adapters.
//!
//! Every delegation target is wrapped behind the uniform `RestakingAdapter`
//! interface; the vault ledger never branches on which external protocol an
//! adapter fronts. `DelegationAdapter` is the deployable reference
//! implementation used by the test suite and as the template for
//! protocol-specific wrappers.

pub mod interface;
pub mod delegation_adapter;
pub mod errors;
pub mod events;

#[cfg(test)]
mod tests;

pub use interface::RestakingAdapterContractRef;
pub use delegation_adapter::DelegationAdapter;
pub use errors::AdapterError;
