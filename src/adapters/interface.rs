//! Uniform capability interface for restaking adapters.
use odra::prelude::*;
use odra::casper_types::U256;

/// External adapter interface the vault ledger dispatches through.
///
/// Implementations wrap one external restaking protocol each and manage
/// their own delay and claim-ticket semantics. `delegate` is synchronous;
/// `undelegate` queues a withdrawal and returns the best-effort actual
/// amount (external protocols may round); `claim` reverts until the
/// adapter's unlock condition has passed and never double-credits a ticket.
/// `get_deposited` reflects slashing already applied by the external
/// protocol.
#[odra::external_contract]
pub trait RestakingAdapter {
    /// Delegate `amount` (already transferred to the adapter) to `target`.
    fn delegate(&mut self, target: Address, amount: U256);

    /// Queue an undelegation from `target`; returns the actual amount queued.
    fn undelegate(&mut self, target: Address, amount: U256) -> U256;

    /// Claim an unlocked withdrawal ticket for `target`; transfers the
    /// recovered assets back to the vault and returns the amount.
    fn claim(&mut self, target: Address) -> U256;

    /// Queue an out-of-band undelegation bypassing the normal ticket.
    fn emergency_undelegate(&mut self, target: Address, amount: U256) -> U256;

    /// Claim an unlocked emergency ticket for `target`.
    fn emergency_claim(&mut self, target: Address) -> U256;

    /// Total principal still delegated through this adapter, net of slashing.
    fn get_deposited(&self) -> U256;

    /// Principal delegated to a single target, net of slashing.
    fn get_delegated_to(&self, target: Address) -> U256;

    /// Pause delegation and undelegation.
    fn pause(&mut self);

    /// Resume operation.
    fn unpause(&mut self);
}
