//! Withdrawal queue contract.
//!
//! Owns the epoch lifecycle. Every mutating entrypoint is gated to the vault
//! ledger; the queue holds the settled redeem reserve itself so reserved
//! assets can never be re-delegated by mistake.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::math;
use crate::token::Cep18TokenContractRef;
use super::errors::QueueError;
use super::events::*;

/// Explicit epoch lifecycle. Transitions only move forward:
/// `Open -> Undelegating -> Claimable`.
#[odra::odra_type]
pub enum EpochState {
    /// Accumulating withdrawal requests
    Open,
    /// Amounts fixed, waiting for adapter obligations
    Undelegating,
    /// Fully settled; entries of this epoch are redeemable
    Claimable,
}

/// Per-epoch ledger. `requested_amount` is immutable once the epoch leaves
/// `Open`; slashing only changes `claimed_amount`.
#[odra::odra_type]
pub struct EpochInfo {
    /// Lifecycle state
    pub state: EpochState,
    /// Shares burned into this epoch
    pub requested_shares: U256,
    /// Asset amount owed to this epoch's receivers, fixed at request time
    pub requested_amount: U256,
    /// Portion settled directly from vault free balance at undelegate time
    pub covered_amount: U256,
    /// Sum of the actual amounts the adapters queued at undelegate time
    pub undelegated_amount: U256,
    /// Sum of amounts returned by adapter claims
    pub claimed_amount: U256,
    /// Amount reserved for receivers at settlement (min of gross, requested)
    pub settled_amount: U256,
    /// Adapter obligations registered at undelegate time
    pub obligations_total: u32,
    /// Obligations that have reported in
    pub obligations_settled: u32,
}

impl EpochInfo {
    fn open() -> Self {
        Self {
            state: EpochState::Open,
            requested_shares: U256::zero(),
            requested_amount: U256::zero(),
            covered_amount: U256::zero(),
            undelegated_amount: U256::zero(),
            claimed_amount: U256::zero(),
            settled_amount: U256::zero(),
            obligations_total: 0,
            obligations_settled: 0,
        }
    }
}

/// One outstanding claim of a receiver. A receiver may hold several entries
/// across epochs; they are redeemed in request order.
#[odra::odra_type]
pub struct PendingWithdrawal {
    /// Asset amount fixed at request time
    pub amount: U256,
    /// Epoch the entry belongs to
    pub epoch: u64,
}

/// Withdrawal queue contract
#[odra::module]
pub struct WithdrawalQueue {
    /// Vault ledger allowed to drive the queue
    vault: Var<Address>,
    /// Underlying asset token; the redeem reserve is held by this contract
    asset_token: Var<Address>,
    /// Epoch currently accepting requests
    current_epoch: Var<u64>,
    /// Append-only per-epoch ledger
    epochs: Mapping<u64, EpochInfo>,
    /// Obligation amount per (epoch, adapter, target)
    adapter_claims: Mapping<(u64, Address, Address), U256>,
    /// Idempotency latch per obligation
    adapter_claimed: Mapping<(u64, Address, Address), bool>,
    /// Ordered pending entries per receiver
    pending_withdrawals: Mapping<Address, Vec<PendingWithdrawal>>,
    /// Requested amounts of epochs that have not settled yet
    total_requested_pending: Var<U256>,
    /// Settled assets reserved for receivers
    total_amount_redeem: Var<U256>,
}

#[odra::module]
impl WithdrawalQueue {
    /// Initializes the queue.
    ///
    /// `legacy_receivers`/`legacy_amounts` migrate entries from the previous
    /// pending-withdrawal scheme into epoch 0. Entries are kept as
    /// independent records in array order; duplicate receivers are neither
    /// deduplicated nor summed.
    pub fn init(
        &mut self,
        vault: Address,
        asset_token: Address,
        legacy_receivers: Vec<Address>,
        legacy_amounts: Vec<U256>,
    ) {
        self.vault.set(vault);
        self.asset_token.set(asset_token);
        self.current_epoch.set(0);

        if legacy_receivers.len() != legacy_amounts.len() {
            self.env().revert(QueueError::NullParams);
        }

        let mut epoch = EpochInfo::open();
        let mut total = U256::zero();
        for (receiver, amount) in legacy_receivers
            .into_iter()
            .zip(legacy_amounts.into_iter())
        {
            if amount.is_zero() {
                self.env().revert(QueueError::ValueZero);
            }
            let mut entries = self.pending_withdrawals.get(&receiver).unwrap_or_default();
            entries.push(PendingWithdrawal { amount, epoch: 0 });
            self.pending_withdrawals.set(&receiver, entries);
            epoch.requested_amount += amount;
            total += amount;
        }
        self.epochs.set(&0, epoch);
        self.total_requested_pending.set(total);
        self.total_amount_redeem.set(U256::zero());
    }

    /// Records a withdrawal request in the open epoch (vault only).
    pub fn request(&mut self, receiver: Address, amount: U256, shares: U256) {
        self.only_vault();

        if amount.is_zero() {
            self.env().revert(QueueError::ValueZero);
        }

        let epoch_id = self.current_epoch.get_or_default();
        let mut epoch = self.epoch_or_open(epoch_id);
        if !matches!(epoch.state, EpochState::Open) {
            self.env().revert(QueueError::EpochNotOpen);
        }

        epoch.requested_amount += amount;
        epoch.requested_shares += shares;
        self.epochs.set(&epoch_id, epoch);

        let mut entries = self.pending_withdrawals.get(&receiver).unwrap_or_default();
        entries.push(PendingWithdrawal {
            amount,
            epoch: epoch_id,
        });
        self.pending_withdrawals.set(&receiver, entries);

        let total = self.total_requested_pending.get_or_default();
        self.total_requested_pending.set(total + amount);

        self.env().emit_event(WithdrawalRequested {
            receiver,
            epoch: epoch_id,
            amount,
            shares,
        });
    }

    /// Fixes the current epoch's amounts, registers adapter obligations and
    /// opens the next epoch (vault only).
    ///
    /// `amounts` are the actual amounts the adapters queued;
    /// `covered_amount` is the portion the vault settled directly from free
    /// balance (its assets must be transferred to the queue beforehand).
    /// Empty obligation arrays settle the epoch immediately.
    pub fn undelegate(
        &mut self,
        epoch_id: u64,
        adapters: Vec<Address>,
        targets: Vec<Address>,
        amounts: Vec<U256>,
        covered_amount: U256,
    ) {
        self.only_vault();

        if epoch_id != self.current_epoch.get_or_default() {
            self.env().revert(QueueError::EpochMismatch);
        }
        if adapters.len() != targets.len() || adapters.len() != amounts.len() {
            self.env().revert(QueueError::NullParams);
        }

        let mut epoch = self.epoch_or_open(epoch_id);
        if !matches!(epoch.state, EpochState::Open) {
            self.env().revert(QueueError::EpochNotOpen);
        }

        let obligations = adapters.len() as u32;
        let mut undelegated_amount = U256::zero();
        for i in 0..adapters.len() {
            if amounts[i].is_zero() {
                self.env().revert(QueueError::ValueZero);
            }
            let key = (epoch_id, adapters[i], targets[i]);
            if self.adapter_claims.get(&key).is_some() {
                self.env().revert(QueueError::NullParams);
            }
            self.adapter_claims.set(&key, amounts[i]);
            undelegated_amount += amounts[i];
        }

        epoch.state = EpochState::Undelegating;
        epoch.covered_amount = covered_amount;
        epoch.undelegated_amount = undelegated_amount;
        epoch.obligations_total = obligations;
        let requested_amount = epoch.requested_amount;
        self.epochs.set(&epoch_id, epoch);

        self.env().emit_event(EpochUndelegated {
            epoch: epoch_id,
            requested_amount,
            covered_amount,
            obligations,
        });

        if obligations == 0 {
            self.settle_epoch(epoch_id);
        }

        let next = epoch_id + 1;
        self.current_epoch.set(next);
        self.epochs.set(&next, EpochInfo::open());
    }

    /// Records one adapter obligation's returned amount (vault only).
    ///
    /// The vault transfers the returned assets to the queue before calling.
    /// When the last obligation reports in the epoch settles.
    pub fn record_claim(
        &mut self,
        epoch_id: u64,
        adapter: Address,
        target: Address,
        returned: U256,
    ) {
        self.only_vault();

        let mut epoch = match self.epochs.get(&epoch_id) {
            Some(epoch) => epoch,
            None => self.env().revert(QueueError::ClaimUnknownAdapter),
        };
        match epoch.state {
            EpochState::Open => self.env().revert(QueueError::EpochNotUndelegating),
            EpochState::Claimable => self.env().revert(QueueError::ClaimAlreadyProcessed),
            EpochState::Undelegating => {}
        }

        let key = (epoch_id, adapter, target);
        if self.adapter_claims.get(&key).is_none() {
            self.env().revert(QueueError::ClaimUnknownAdapter);
        }
        if self.adapter_claimed.get(&key).unwrap_or_default() {
            self.env().revert(QueueError::ClaimAlreadyProcessed);
        }
        self.adapter_claimed.set(&key, true);

        epoch.claimed_amount += returned;
        epoch.obligations_settled += 1;
        let done = epoch.obligations_settled == epoch.obligations_total;
        self.epochs.set(&epoch_id, epoch);

        if done {
            self.settle_epoch(epoch_id);
        }
    }

    /// Pays out the receiver's earliest fully-settled entry (vault only).
    ///
    /// Returns the amount paid. Reverts when nothing is settled; callers
    /// check `has_redeemable` first to keep "not ready" a non-error.
    pub fn redeem(&mut self, receiver: Address) -> U256 {
        self.only_vault();

        let mut entries = self.pending_withdrawals.get(&receiver).unwrap_or_default();
        let mut found: Option<usize> = None;
        for (i, entry) in entries.iter().enumerate() {
            if self.is_epoch_claimable(entry.epoch) {
                found = Some(i);
                break;
            }
        }
        let index = match found {
            Some(index) => index,
            None => self.env().revert(QueueError::IsNotAbleToRedeem),
        };

        let entry = entries.remove(index);
        self.pending_withdrawals.set(&receiver, entries);

        let payout = self.entry_payout(&entry);
        if !payout.is_zero() {
            let reserve = self.total_amount_redeem.get_or_default();
            self.total_amount_redeem.set(reserve - payout);
            self.transfer_asset(receiver, payout);
        }

        self.env().emit_event(WithdrawalRedeemed {
            receiver,
            epoch: entry.epoch,
            amount: payout,
        });

        payout
    }

    // View functions

    pub fn get_current_epoch(&self) -> u64 {
        self.current_epoch.get_or_default()
    }

    pub fn get_epoch_info(&self, epoch_id: u64) -> Option<EpochInfo> {
        self.epochs.get(&epoch_id)
    }

    pub fn get_pending_withdrawals_of(&self, receiver: Address) -> Vec<PendingWithdrawal> {
        self.pending_withdrawals.get(&receiver).unwrap_or_default()
    }

    /// Obligation amount registered for a pair, if any.
    pub fn get_obligation(
        &self,
        epoch_id: u64,
        adapter: Address,
        target: Address,
    ) -> Option<U256> {
        self.adapter_claims.get(&(epoch_id, adapter, target))
    }

    /// Whether the receiver has at least one settled entry to redeem.
    pub fn has_redeemable(&self, receiver: Address) -> bool {
        let entries = self.pending_withdrawals.get(&receiver).unwrap_or_default();
        entries
            .iter()
            .any(|entry| self.is_epoch_claimable(entry.epoch))
    }

    /// Payout of the receiver's earliest settled entry, zero if none.
    pub fn get_redeemable_amount(&self, receiver: Address) -> U256 {
        let entries = self.pending_withdrawals.get(&receiver).unwrap_or_default();
        for entry in entries.iter() {
            if self.is_epoch_claimable(entry.epoch) {
                return self.entry_payout(entry);
            }
        }
        U256::zero()
    }

    /// Requested amounts of epochs that have not settled yet.
    pub fn get_total_requested_pending(&self) -> U256 {
        self.total_requested_pending.get_or_default()
    }

    /// Settled assets reserved for receivers.
    pub fn get_redeem_reserve(&self) -> U256 {
        self.total_amount_redeem.get_or_default()
    }

    // Internal helpers

    /// Settlement: reserve what came back, capped by what was requested;
    /// over-delivery goes back to the vault.
    fn settle_epoch(&mut self, epoch_id: u64) {
        let mut epoch = self.epoch_or_open(epoch_id);
        epoch.state = EpochState::Claimable;

        let gross = epoch.covered_amount + epoch.claimed_amount;
        let settled = if gross > epoch.requested_amount {
            epoch.requested_amount
        } else {
            gross
        };
        let excess = gross - settled;
        epoch.settled_amount = settled;

        let requested = epoch.requested_amount;
        self.epochs.set(&epoch_id, epoch);

        let reserve = self.total_amount_redeem.get_or_default();
        self.total_amount_redeem.set(reserve + settled);
        let pending = self.total_requested_pending.get_or_default();
        self.total_requested_pending.set(pending - requested);

        if !excess.is_zero() {
            let vault = self.vault.get_or_revert_with(QueueError::OnlyVaultAllowed);
            self.transfer_asset(vault, excess);
        }

        self.env().emit_event(EpochSettled {
            epoch: epoch_id,
            settled_amount: settled,
            excess,
        });
    }

    fn entry_payout(&self, entry: &PendingWithdrawal) -> U256 {
        let epoch = match self.epochs.get(&entry.epoch) {
            Some(epoch) => epoch,
            None => return U256::zero(),
        };
        // Socializes in-flight slashing pro-rata across the epoch.
        math::mul_div(entry.amount, epoch.settled_amount, epoch.requested_amount)
    }

    fn is_epoch_claimable(&self, epoch_id: u64) -> bool {
        match self.epochs.get(&epoch_id) {
            Some(epoch) => matches!(epoch.state, EpochState::Claimable),
            None => false,
        }
    }

    fn epoch_or_open(&self, epoch_id: u64) -> EpochInfo {
        self.epochs.get(&epoch_id).unwrap_or_else(EpochInfo::open)
    }

    fn transfer_asset(&mut self, to: Address, amount: U256) {
        let token_address = self
            .asset_token
            .get_or_revert_with(QueueError::OnlyVaultAllowed);
        let mut token = Cep18TokenContractRef::new(self.env(), token_address);
        token.transfer(to, amount);
    }

    fn only_vault(&self) {
        let caller = self.env().caller();
        let vault = self.vault.get_or_revert_with(QueueError::OnlyVaultAllowed);
        if caller != vault {
            self.env().revert(QueueError::OnlyVaultAllowed);
        }
    }
}
