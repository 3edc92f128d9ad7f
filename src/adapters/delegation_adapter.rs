//! Reference restaking adapter.
//!
//! Implements the `RestakingAdapter` capability set against a simple
//! delegation book with a fixed unlock delay: one outstanding withdrawal
//! ticket per target, a separate emergency ticket, and a trustee hook that
//! applies externally observed slashing to the book. Protocol-specific
//! adapters replace the book with real protocol calls but keep this surface.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::token::Cep18TokenContractRef;
use super::errors::AdapterError;
use super::events::*;

/// A queued withdrawal awaiting its unlock time.
#[odra::odra_type]
pub struct WithdrawalTicket {
    /// Amount queued for withdrawal; shrinks if the ticket is slashed
    pub amount: U256,
    /// Timestamp at which the ticket becomes claimable
    pub unlock_at: u64,
}

/// Reference adapter contract
#[odra::module]
pub struct DelegationAdapter {
    /// Vault ledger allowed to drive the adapter
    vault: Var<Address>,
    /// Trustee manager (operations account) with the same driving rights
    trustee: Var<Address>,
    /// Underlying asset token
    asset_token: Var<Address>,
    /// Principal delegated per target
    delegated: Mapping<Address, U256>,
    /// Sum of per-target principal
    total_delegated: Var<U256>,
    /// Outstanding normal withdrawal ticket per target
    tickets: Mapping<Address, Option<WithdrawalTicket>>,
    /// Outstanding emergency ticket per target
    emergency_tickets: Mapping<Address, Option<WithdrawalTicket>>,
    /// Unlock delay applied to every ticket, in milliseconds
    unlock_delay: Var<u64>,
    /// Whether the adapter is paused
    paused: Var<bool>,
}

#[odra::module]
impl DelegationAdapter {
    pub fn init(
        &mut self,
        vault: Address,
        trustee: Address,
        asset_token: Address,
        unlock_delay: u64,
    ) {
        self.vault.set(vault);
        self.trustee.set(trustee);
        self.asset_token.set(asset_token);
        self.total_delegated.set(U256::zero());
        self.unlock_delay.set(unlock_delay);
        self.paused.set(false);
    }

    /// Record a delegation. The vault transfers the assets before calling.
    pub fn delegate(&mut self, target: Address, amount: U256) {
        self.only_vault_or_trustee();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(AdapterError::ValueZero);
        }

        let current = self.delegated.get(&target).unwrap_or_default();
        self.delegated.set(&target, current + amount);
        let total = self.total_delegated.get_or_default();
        self.total_delegated.set(total + amount);

        self.env().emit_event(Delegated { target, amount });
    }

    /// Queue a withdrawal from a target. One outstanding ticket per target.
    pub fn undelegate(&mut self, target: Address, amount: U256) -> U256 {
        self.only_vault_or_trustee();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(AdapterError::ValueZero);
        }
        if self.pending_ticket(&target).is_some() {
            self.env().revert(AdapterError::PendingWithdrawalExists);
        }

        let current = self.delegated.get(&target).unwrap_or_default();
        if current < amount {
            self.env().revert(AdapterError::InsufficientDelegated);
        }

        self.delegated.set(&target, current - amount);
        let total = self.total_delegated.get_or_default();
        self.total_delegated.set(total - amount);

        let unlock_at = self.env().get_block_time() + self.unlock_delay.get_or_default();
        self.tickets
            .set(&target, Some(WithdrawalTicket { amount, unlock_at }));

        self.env().emit_event(UndelegateQueued {
            target,
            amount,
            unlock_at,
        });

        amount
    }

    /// Claim an unlocked ticket; transfers the recovered assets to the vault.
    ///
    /// Returns the amount actually recovered, which is lower than the queued
    /// amount if the ticket was slashed while in flight.
    pub fn claim(&mut self, target: Address) -> U256 {
        self.only_vault_or_trustee();

        let ticket = match self.pending_ticket(&target) {
            Some(ticket) => ticket,
            None => {
                if self.pending_emergency_ticket(&target).is_some() {
                    self.env().revert(AdapterError::OnlyEmergencyClaimAllowed)
                }
                self.env().revert(AdapterError::NothingToClaim)
            }
        };

        if self.env().get_block_time() < ticket.unlock_at {
            self.env().revert(AdapterError::WithdrawalNotUnlocked);
        }

        // Ticket cleared before the transfer; claiming twice cannot
        // double-credit.
        self.tickets.set(&target, None);
        self.transfer_to_vault(ticket.amount);

        self.env().emit_event(Claimed {
            target,
            amount: ticket.amount,
        });

        ticket.amount
    }

    /// Queue an out-of-band withdrawal, independent of the normal ticket.
    pub fn emergency_undelegate(&mut self, target: Address, amount: U256) -> U256 {
        self.only_vault_or_trustee();

        if amount.is_zero() {
            self.env().revert(AdapterError::ValueZero);
        }
        if self.pending_emergency_ticket(&target).is_some() {
            self.env().revert(AdapterError::PendingWithdrawalExists);
        }

        let current = self.delegated.get(&target).unwrap_or_default();
        if current < amount {
            self.env().revert(AdapterError::InsufficientDelegated);
        }

        self.delegated.set(&target, current - amount);
        let total = self.total_delegated.get_or_default();
        self.total_delegated.set(total - amount);

        let unlock_at = self.env().get_block_time() + self.unlock_delay.get_or_default();
        self.emergency_tickets
            .set(&target, Some(WithdrawalTicket { amount, unlock_at }));

        self.env().emit_event(EmergencyQueued {
            target,
            amount,
            unlock_at,
        });

        amount
    }

    /// Claim an unlocked emergency ticket back to the vault.
    pub fn emergency_claim(&mut self, target: Address) -> U256 {
        self.only_vault_or_trustee();

        let ticket = match self.pending_emergency_ticket(&target) {
            Some(ticket) => ticket,
            None => self.env().revert(AdapterError::NothingToClaim),
        };

        if self.env().get_block_time() < ticket.unlock_at {
            self.env().revert(AdapterError::WithdrawalNotUnlocked);
        }

        self.emergency_tickets.set(&target, None);
        self.transfer_to_vault(ticket.amount);

        self.env().emit_event(EmergencyClaimed {
            target,
            amount: ticket.amount,
        });

        ticket.amount
    }

    /// Apply an externally observed slash to the book (trustee only).
    ///
    /// Principal is burned first; any remainder comes out of in-flight
    /// tickets, normal before emergency. The seized assets stay with the
    /// external protocol; only the book shrinks.
    pub fn report_slash(&mut self, target: Address, amount: U256) {
        self.only_trustee();

        if amount.is_zero() {
            self.env().revert(AdapterError::ValueZero);
        }

        let mut remaining = amount;

        let principal = self.delegated.get(&target).unwrap_or_default();
        let from_principal = if principal < remaining { principal } else { remaining };
        if !from_principal.is_zero() {
            self.delegated.set(&target, principal - from_principal);
            let total = self.total_delegated.get_or_default();
            self.total_delegated.set(total - from_principal);
            remaining -= from_principal;
        }

        if !remaining.is_zero() {
            if let Some(mut ticket) = self.pending_ticket(&target) {
                let from_ticket = if ticket.amount < remaining {
                    ticket.amount
                } else {
                    remaining
                };
                ticket.amount -= from_ticket;
                remaining -= from_ticket;
                self.tickets.set(&target, Some(ticket));
            }
        }

        if !remaining.is_zero() {
            if let Some(mut ticket) = self.pending_emergency_ticket(&target) {
                let from_ticket = if ticket.amount < remaining {
                    ticket.amount
                } else {
                    remaining
                };
                ticket.amount -= from_ticket;
                remaining -= from_ticket;
                self.emergency_tickets.set(&target, Some(ticket));
            }
        }

        if !remaining.is_zero() {
            self.env().revert(AdapterError::SlashExceedsDelegated);
        }

        self.env().emit_event(SlashReported { target, amount });
    }

    // View functions

    /// Total principal still delegated, net of slashing. Excludes queued
    /// tickets, which the vault accounts for as in-transit.
    pub fn get_deposited(&self) -> U256 {
        self.total_delegated.get_or_default()
    }

    pub fn get_delegated_to(&self, target: Address) -> U256 {
        self.delegated.get(&target).unwrap_or_default()
    }

    pub fn get_pending_withdrawal(&self, target: Address) -> Option<WithdrawalTicket> {
        self.pending_ticket(&target)
    }

    pub fn get_pending_emergency(&self, target: Address) -> Option<WithdrawalTicket> {
        self.pending_emergency_ticket(&target)
    }

    pub fn get_unlock_delay(&self) -> u64 {
        self.unlock_delay.get_or_default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // Admin functions

    pub fn pause(&mut self) {
        self.only_trustee();
        self.paused.set(true);
    }

    pub fn unpause(&mut self) {
        self.only_trustee();
        self.paused.set(false);
    }

    // Internal helpers

    fn pending_ticket(&self, target: &Address) -> Option<WithdrawalTicket> {
        self.tickets.get(target).flatten()
    }

    fn pending_emergency_ticket(&self, target: &Address) -> Option<WithdrawalTicket> {
        self.emergency_tickets.get(target).flatten()
    }

    fn transfer_to_vault(&mut self, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let vault = self
            .vault
            .get_or_revert_with(AdapterError::NotVaultOrTrusteeManager);
        let token_address = self
            .asset_token
            .get_or_revert_with(AdapterError::NotVaultOrTrusteeManager);
        let mut token = Cep18TokenContractRef::new(self.env(), token_address);
        token.transfer(vault, amount);
    }

    fn only_vault_or_trustee(&self) {
        let caller = self.env().caller();
        let vault = self
            .vault
            .get_or_revert_with(AdapterError::NotVaultOrTrusteeManager);
        let trustee = self
            .trustee
            .get_or_revert_with(AdapterError::NotVaultOrTrusteeManager);
        if caller != vault && caller != trustee {
            self.env().revert(AdapterError::NotVaultOrTrusteeManager);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(AdapterError::AdapterPaused);
        }
    }

    fn only_trustee(&self) {
        let caller = self.env().caller();
        let trustee = self
            .trustee
            .get_or_revert_with(AdapterError::NotVaultOrTrusteeManager);
        if caller != trustee {
            self.env().revert(AdapterError::NotVaultOrTrusteeManager);
        }
    }
}
