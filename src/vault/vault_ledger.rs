//! Vault ledger, the accounting core of the suite.
//!
//! Tracks pooled deposits of a single underlying asset, mints and burns the
//! proportional claim token, routes idle capital to registered restaking
//! adapters and resolves withdrawals through the epoch-batched queue. The
//! ledger stays solvent through slashing by pricing withdrawal requests at
//! the corrected ratio and socializing in-flight losses pro-rata within the
//! affected epoch.
//!
//! Asset buckets, all tracked explicitly:
//! - `free_balance`: idle backing held by the vault
//! - `total_delegated`: principal in adapters (cache of adapter reports)
//! - `total_pending_withdrawals`: in transit for unsettled epochs
//! - `total_pending_emergency`: in transit through the emergency path
//! - `deposit_bonus_pool`: fee-funded, not share backing
//! - the settled redeem reserve lives in the withdrawal queue
//!
//! Share backing is the sum of the first four buckets minus the requested
//! amounts of unsettled epochs; the local ratio is claim supply over backing.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::math;
use crate::oracle;
use crate::token::Cep18TokenContractRef;
use crate::oracle::ratio_feed::RatioFeedContractRef;
use crate::queue::withdrawal_queue::{EpochState, WithdrawalQueueContractRef};
use crate::adapters::interface::RestakingAdapterContractRef;
use super::claim_token::ClaimTokenContractRef;
use super::errors::VaultError;
use super::events::*;
use super::fee_curves::{self, DepositBonusParams, FlashFeeParams};

/// Default dust guard for deposits and withdrawals; owners tune it to the
/// asset's decimals.
const DEFAULT_MIN_AMOUNT: u64 = 100;

/// Default consumer-side oracle deviation guard: 5%.
const DEFAULT_MAX_RATIO_GAP_BP: u64 = 500;

/// Vault ledger contract
#[odra::module]
pub struct VaultLedger {
    /// Underlying asset token
    asset_token: Var<Address>,
    /// Claim (share) token
    claim_token: Var<Address>,
    /// Withdrawal queue, wired by the owner after deployment
    withdrawal_queue: Var<Address>,
    /// Ratio feed; unset means the local ratio is used
    ratio_feed: Var<Address>,
    /// Contract owner
    owner: Var<Address>,
    /// Operator driving delegation and settlement
    operator: Var<Address>,
    /// Treasury receiving half of every flash fee
    treasury: Var<Address>,
    /// Whether the vault is paused
    paused: Var<bool>,

    /// Idle backing assets held by the vault
    free_balance: Var<U256>,
    /// Cached sum of adapter-reported principal
    total_delegated: Var<U256>,
    /// Assets in transit for unsettled epochs
    total_pending_withdrawals: Var<U256>,
    /// Assets in transit through the emergency path
    total_pending_emergency: Var<U256>,
    /// Fee-funded pool that pays deposit bonuses
    deposit_bonus_pool: Var<U256>,

    /// Registered adapters, insertion-ordered
    adapter_list: Mapping<u32, Address>,
    /// Number of registered adapters
    adapter_count: Var<u32>,
    /// Adapter membership
    adapter_registered: Mapping<Address, bool>,
    /// Emergency amounts recorded per (adapter, target)
    emergency_recorded: Mapping<(Address, Address), U256>,
    /// Epochs whose settlement bookkeeping has been applied
    epoch_synced: Mapping<u64, bool>,

    /// Minimum deposit amount
    min_deposit: Var<U256>,
    /// Minimum withdrawal amount
    min_withdraw: Var<U256>,
    /// Flash capacity target the curves are anchored to
    target_capacity: Var<U256>,
    /// Consumer-side oracle deviation guard in basis points
    max_ratio_gap_bp: Var<u64>,
    /// Deposit bonus curve parameters
    deposit_bonus_params: Var<DepositBonusParams>,
    /// Flash fee curve parameters
    flash_fee_params: Var<FlashFeeParams>,
}

#[odra::module]
impl VaultLedger {
    pub fn init(
        &mut self,
        asset_token: Address,
        claim_token: Address,
        operator: Address,
        treasury: Address,
    ) {
        let caller = self.env().caller();
        self.asset_token.set(asset_token);
        self.claim_token.set(claim_token);
        self.owner.set(caller);
        self.operator.set(operator);
        self.treasury.set(treasury);
        self.paused.set(false);

        self.free_balance.set(U256::zero());
        self.total_delegated.set(U256::zero());
        self.total_pending_withdrawals.set(U256::zero());
        self.total_pending_emergency.set(U256::zero());
        self.deposit_bonus_pool.set(U256::zero());
        self.adapter_count.set(0);

        self.min_deposit.set(U256::from(DEFAULT_MIN_AMOUNT));
        self.min_withdraw.set(U256::from(DEFAULT_MIN_AMOUNT));
        self.target_capacity.set(U256::zero());
        self.max_ratio_gap_bp.set(DEFAULT_MAX_RATIO_GAP_BP);
        self.deposit_bonus_params
            .set(DepositBonusParams::default_params());
        self.flash_fee_params.set(FlashFeeParams::default_params());
    }

    // ========================================
    // User surface
    // ========================================

    /// Deposit assets and mint claim shares at the current ratio.
    ///
    /// Deposits that replenish flash capacity towards its target earn a
    /// bonus from the fee-funded pool; the bonus is credited as extra
    /// backing, so the minted shares correspond to `amount + bonus`.
    pub fn deposit(&mut self, amount: U256, receiver: Address) -> U256 {
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        if amount < self.min_deposit.get_or_default() {
            self.env().revert(VaultError::LowerMinAmount);
        }
        let self_address = Address::from(self.env().self_address());
        if receiver == self_address {
            self.env().revert(VaultError::InvalidAddress);
        }

        let caller = self.env().caller();
        let ratio = self.ratio();
        let capacity = self.free_balance.get_or_default();
        let target = self.target_capacity.get_or_default();
        let params = self.bonus_params();

        let mut bonus = fee_curves::calculate_deposit_bonus(amount, capacity, target, &params);
        let pool = self.deposit_bonus_pool.get_or_default();
        if bonus > pool {
            bonus = pool;
        }

        let shares = math::convert_to_shares(amount + bonus, ratio);

        if !bonus.is_zero() {
            self.deposit_bonus_pool.set(pool - bonus);
        }
        self.free_balance.set(capacity + amount + bonus);

        let mut asset = self.asset_ref();
        asset.transfer_from(caller, self_address, amount);
        let mut claim = self.claim_ref();
        claim.mint(receiver, shares);

        if !bonus.is_zero() {
            self.env().emit_event(DepositBonus { amount: bonus });
        }
        self.env().emit_event(Deposit {
            sender: caller,
            receiver,
            amount,
            shares,
        });

        shares
    }

    /// Burn shares and enqueue the corresponding amount into the current
    /// epoch. The burn happens now, at the current ratio; later slashing
    /// adjusts what the epoch pays out, never what was requested.
    pub fn withdraw(&mut self, shares: U256, receiver: Address) -> U256 {
        self.ensure_not_paused();

        if shares.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        let self_address = Address::from(self.env().self_address());
        if receiver == self_address {
            self.env().revert(VaultError::InvalidAddress);
        }

        let caller = self.env().caller();
        let ratio = self.ratio();
        let amount = math::convert_to_assets(shares, ratio);
        if amount < self.min_withdraw.get_or_default() {
            self.env().revert(VaultError::LowerMinAmount);
        }

        let mut queue = self.queue_ref();
        let epoch = queue.get_current_epoch();

        let mut claim = self.claim_ref();
        claim.burn(caller, shares);
        queue.request(receiver, amount, shares);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner: caller,
            amount,
            shares,
            epoch,
        });

        amount
    }

    /// Instant withdrawal against the flash capacity, for a fee.
    ///
    /// Half of the fee goes to the treasury, the other half funds future
    /// deposit bonuses.
    pub fn flash_withdraw(&mut self, shares: U256, receiver: Address, min_out: U256) -> U256 {
        self.ensure_not_paused();

        if shares.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }

        let caller = self.env().caller();
        let ratio = self.ratio();
        let amount = math::convert_to_assets(shares, ratio);
        if amount < self.min_withdraw.get_or_default() {
            self.env().revert(VaultError::LowerMinAmount);
        }

        let capacity = self.free_balance.get_or_default();
        if amount > capacity {
            self.env().revert(VaultError::InsufficientCapacity);
        }

        let target = self.target_capacity.get_or_default();
        let params = self.fee_params();
        let fee = fee_curves::calculate_flash_withdraw_fee(amount, capacity, target, &params);
        let net = amount - fee;
        if net < min_out {
            self.env().revert(VaultError::ExceedsMaxSlippage);
        }

        let treasury_share = fee / U256::from(2u64);
        let pool_share = fee - treasury_share;

        self.free_balance.set(capacity - amount);
        let pool = self.deposit_bonus_pool.get_or_default();
        self.deposit_bonus_pool.set(pool + pool_share);

        let mut claim = self.claim_ref();
        claim.burn(caller, shares);

        let mut asset = self.asset_ref();
        asset.transfer(receiver, net);
        if !treasury_share.is_zero() {
            let treasury = self.treasury.get_or_revert_with(VaultError::InvalidAddress);
            asset.transfer(treasury, treasury_share);
        }

        self.env().emit_event(WithdrawalFee { fee });
        self.env().emit_event(FlashWithdraw {
            sender: caller,
            receiver,
            owner: caller,
            amount,
            shares,
            fee,
        });

        net
    }

    /// Pay out the receiver's earliest settled withdrawal, if any.
    ///
    /// Callable by anyone on behalf of a receiver. Nothing settled is a
    /// valid state, not an error: the call returns zero and emits nothing.
    pub fn redeem(&mut self, receiver: Address) -> U256 {
        self.ensure_not_paused();

        let mut queue = self.queue_ref();
        if !queue.has_redeemable(receiver) {
            return U256::zero();
        }

        let amount = queue.redeem(receiver);

        self.env().emit_event(Redeem {
            sender: self.env().caller(),
            receiver,
            amount,
        });

        amount
    }

    // ========================================
    // Operator surface
    // ========================================

    /// Delegate free balance to a target through a registered adapter.
    pub fn delegate(&mut self, adapter: Address, target: Address, amount: U256) {
        self.only_operator();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        self.ensure_registered(adapter);

        let free = self.free_balance.get_or_default();
        if amount > free {
            self.env().revert(VaultError::InsufficientCapacity);
        }

        self.free_balance.set(free - amount);
        let delegated = self.total_delegated.get_or_default();
        self.total_delegated.set(delegated + amount);

        let mut asset = self.asset_ref();
        asset.transfer(adapter, amount);
        let mut adapter_ref = RestakingAdapterContractRef::new(self.env(), adapter);
        adapter_ref.delegate(target, amount);

        self.env().emit_event(DelegatedTo {
            adapter,
            target,
            amount,
        });
    }

    /// Fix the current epoch's amounts, queue withdrawals with the adapters
    /// and roll the queue over to the next epoch.
    ///
    /// Any shortfall between the epoch's requested amount and the entries'
    /// sum is covered immediately from free balance. Empty entry lists are a
    /// valid rollover and settle the epoch from free balance alone.
    pub fn undelegate(
        &mut self,
        epoch_id: u64,
        adapters: Vec<Address>,
        targets: Vec<Address>,
        amounts: Vec<U256>,
    ) {
        self.only_operator();
        self.ensure_not_paused();

        if adapters.len() != targets.len() || adapters.len() != amounts.len() {
            self.env().revert(VaultError::NullParams);
        }

        let queue_address = self.queue_address();
        let mut queue = self.queue_ref();
        if epoch_id != queue.get_current_epoch() {
            self.env().revert(VaultError::UndelegateEpochMismatch);
        }

        let requested = queue
            .get_epoch_info(epoch_id)
            .map(|info| info.requested_amount)
            .unwrap_or_default();

        let mut planned = U256::zero();
        for amount in amounts.iter() {
            planned += *amount;
        }
        let covered = if requested > planned {
            requested - planned
        } else {
            U256::zero()
        };
        if covered > self.free_balance.get_or_default() {
            self.env().revert(VaultError::InsufficientCapacity);
        }

        let mut actuals: Vec<U256> = Vec::new();
        for i in 0..adapters.len() {
            self.ensure_registered(adapters[i]);

            let mut adapter_ref = RestakingAdapterContractRef::new(self.env(), adapters[i]);
            let actual = adapter_ref.undelegate(targets[i], amounts[i]);

            let delegated = self.total_delegated.get_or_default();
            self.total_delegated.set(delegated - actual);
            let pending = self.total_pending_withdrawals.get_or_default();
            self.total_pending_withdrawals.set(pending + actual);
            actuals.push(actual);

            self.env().emit_event(UndelegatedFrom {
                adapter: adapters[i],
                target: targets[i],
                epoch: epoch_id,
                actual_amount: actual,
            });
        }

        if !covered.is_zero() {
            let free = self.free_balance.get_or_default();
            self.free_balance.set(free - covered);
            let pending = self.total_pending_withdrawals.get_or_default();
            self.total_pending_withdrawals.set(pending + covered);
            let mut asset = self.asset_ref();
            asset.transfer(queue_address, covered);
        }

        queue.undelegate(epoch_id, adapters, targets, actuals, covered);

        self.env().emit_event(EpochAdvanced {
            epoch: epoch_id,
            requested_amount: requested,
            covered_amount: covered,
        });

        self.sync_settled_epoch(epoch_id);
    }

    /// Roll the epoch over without touching any adapter. Used to release
    /// previously recovered funds (e.g. from the emergency path) into the
    /// normal queue.
    pub fn update_epoch(&mut self) {
        let current = self.queue_ref().get_current_epoch();
        self.undelegate(current, Vec::new(), Vec::new(), Vec::new());
    }

    /// Claim unlocked adapter withdrawals for an epoch and forward the
    /// recovered assets to the queue. The epoch settles when its last
    /// obligation reports in.
    ///
    /// An adapter whose unlock has not passed reverts the whole call;
    /// nothing is partially recorded and the call can simply be retried.
    pub fn claim(&mut self, epoch_id: u64, adapters: Vec<Address>, targets: Vec<Address>) {
        self.only_operator();
        self.ensure_not_paused();

        if adapters.len() != targets.len() {
            self.env().revert(VaultError::NullParams);
        }

        let queue_address = self.queue_address();
        let mut queue = self.queue_ref();

        for i in 0..adapters.len() {
            let mut adapter_ref = RestakingAdapterContractRef::new(self.env(), adapters[i]);
            let returned = adapter_ref.claim(targets[i]);

            if !returned.is_zero() {
                let mut asset = self.asset_ref();
                asset.transfer(queue_address, returned);
            }
            queue.record_claim(epoch_id, adapters[i], targets[i], returned);
        }

        self.sync_settled_epoch(epoch_id);
    }

    /// Pull capital out-of-band, bypassing the epoch queue. Tracked
    /// separately and claimable only through `emergency_claim`.
    pub fn emergency_undelegate(&mut self, adapter: Address, target: Address, amount: U256) {
        self.only_operator();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        self.ensure_registered(adapter);

        let mut adapter_ref = RestakingAdapterContractRef::new(self.env(), adapter);
        let actual = adapter_ref.emergency_undelegate(target, amount);

        let delegated = self.total_delegated.get_or_default();
        self.total_delegated.set(delegated - actual);
        let pending = self.total_pending_emergency.get_or_default();
        self.total_pending_emergency.set(pending + actual);

        let key = (adapter, target);
        let recorded = self.emergency_recorded.get(&key).unwrap_or_default();
        self.emergency_recorded.set(&key, recorded + actual);

        self.env().emit_event(EmergencyUndelegated {
            adapter,
            target,
            amount: actual,
        });
    }

    /// Claim an unlocked emergency ticket back into free balance.
    pub fn emergency_claim(&mut self, adapter: Address, target: Address) {
        self.only_operator();
        self.ensure_not_paused();
        self.ensure_registered(adapter);

        let mut adapter_ref = RestakingAdapterContractRef::new(self.env(), adapter);
        let returned = adapter_ref.emergency_claim(target);

        let key = (adapter, target);
        let recorded = self.emergency_recorded.get(&key).unwrap_or_default();
        self.emergency_recorded.set(&key, U256::zero());

        let pending = self.total_pending_emergency.get_or_default();
        self.total_pending_emergency.set(pending - recorded);
        let free = self.free_balance.get_or_default();
        self.free_balance.set(free + returned);

        self.env().emit_event(EmergencyClaimed {
            adapter,
            amount: returned,
        });
    }

    /// Refresh the cached delegation total from adapter reports. This is how
    /// externally applied slashing reaches the local ratio.
    pub fn update_total_delegated(&mut self) {
        let count = self.adapter_count.get_or_default();
        let mut total = U256::zero();
        for i in 0..count {
            if let Some(adapter) = self.adapter_list.get(&i) {
                let adapter_ref = RestakingAdapterContractRef::new(self.env(), adapter);
                total += adapter_ref.get_deposited();
            }
        }
        self.total_delegated.set(total);

        self.env().emit_event(TotalDelegatedUpdated { total });
    }

    // ========================================
    // Ratio and views
    // ========================================

    /// Current shares-per-asset ratio, 1e18-scaled.
    ///
    /// The published feed value is authoritative once available, clamped by
    /// the deviation guard against the locally computable bound.
    pub fn ratio(&self) -> U256 {
        let local = self.local_ratio();
        match self.ratio_feed.get() {
            Some(feed_address) => {
                let feed = RatioFeedContractRef::new(self.env(), feed_address);
                let token = self
                    .claim_token
                    .get_or_revert_with(VaultError::InvalidAddress);
                let published = feed.get_ratio(token);
                oracle::reconcile_ratio(local, published, self.max_ratio_gap_bp.get_or_default())
            }
            None => local,
        }
    }

    /// Shares minted for an asset amount at the current ratio, bonus aside.
    pub fn convert_to_shares(&self, amount: U256) -> U256 {
        math::convert_to_shares(amount, self.ratio())
    }

    /// Assets claimed by a share amount at the current ratio.
    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        math::convert_to_assets(shares, self.ratio())
    }

    /// Fee a flash withdrawal of `amount` would pay right now.
    pub fn calculate_flash_withdraw_fee(&self, amount: U256) -> U256 {
        fee_curves::calculate_flash_withdraw_fee(
            amount,
            self.free_balance.get_or_default(),
            self.target_capacity.get_or_default(),
            &self.fee_params(),
        )
    }

    /// Bonus a deposit of `amount` would earn right now, before the pool cap.
    pub fn calculate_deposit_bonus(&self, amount: U256) -> U256 {
        fee_curves::calculate_deposit_bonus(
            amount,
            self.free_balance.get_or_default(),
            self.target_capacity.get_or_default(),
            &self.bonus_params(),
        )
    }

    /// Everything the ledger holds or is owed: free balance, delegated
    /// principal, in-transit amounts and the settled redeem reserve.
    pub fn get_total_deposited(&self) -> U256 {
        let reserve = self.queue_ref().get_redeem_reserve();
        self.free_balance.get_or_default()
            + self.total_delegated.get_or_default()
            + self.total_pending_withdrawals.get_or_default()
            + self.total_pending_emergency.get_or_default()
            + reserve
    }

    pub fn get_free_balance(&self) -> U256 {
        self.free_balance.get_or_default()
    }

    /// Idle balance available for instant withdrawal.
    pub fn get_flash_capacity(&self) -> U256 {
        self.free_balance.get_or_default()
    }

    pub fn get_total_delegated(&self) -> U256 {
        self.total_delegated.get_or_default()
    }

    pub fn get_total_pending_withdrawals(&self) -> U256 {
        self.total_pending_withdrawals.get_or_default()
    }

    pub fn get_total_pending_emergency(&self) -> U256 {
        self.total_pending_emergency.get_or_default()
    }

    pub fn get_deposit_bonus_pool(&self) -> U256 {
        self.deposit_bonus_pool.get_or_default()
    }

    pub fn get_adapters(&self) -> Vec<Address> {
        let count = self.adapter_count.get_or_default();
        let mut adapters = Vec::new();
        for i in 0..count {
            if let Some(adapter) = self.adapter_list.get(&i) {
                adapters.push(adapter);
            }
        }
        adapters
    }

    pub fn is_adapter_registered(&self, adapter: Address) -> bool {
        self.adapter_registered.get(&adapter).unwrap_or(false)
    }

    pub fn get_min_deposit(&self) -> U256 {
        self.min_deposit.get_or_default()
    }

    pub fn get_min_withdraw(&self) -> U256 {
        self.min_withdraw.get_or_default()
    }

    pub fn get_target_capacity(&self) -> U256 {
        self.target_capacity.get_or_default()
    }

    pub fn get_max_ratio_gap(&self) -> u64 {
        self.max_ratio_gap_bp.get_or_default()
    }

    pub fn get_deposit_bonus_params(&self) -> DepositBonusParams {
        self.bonus_params()
    }

    pub fn get_flash_fee_params(&self) -> FlashFeeParams {
        self.fee_params()
    }

    pub fn get_operator(&self) -> Address {
        self.operator.get_or_revert_with(VaultError::OnlyOperatorAllowed)
    }

    pub fn get_owner(&self) -> Address {
        self.owner.get_or_revert_with(VaultError::OnlyOwnerAllowed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ========================================
    // Owner surface
    // ========================================

    /// Register an adapter. Registration is append-only; iteration order is
    /// insertion order.
    pub fn add_adapter(&mut self, adapter: Address) {
        self.only_owner();

        if self.adapter_registered.get(&adapter).unwrap_or(false) {
            self.env().revert(VaultError::AdapterAlreadyRegistered);
        }

        self.adapter_registered.set(&adapter, true);
        let count = self.adapter_count.get_or_default();
        self.adapter_list.set(&count, adapter);
        self.adapter_count.set(count + 1);

        self.env().emit_event(AdapterAdded { adapter });
    }

    /// Wire the withdrawal queue (owner only).
    pub fn set_withdrawal_queue(&mut self, withdrawal_queue: Address) {
        self.only_owner();
        self.withdrawal_queue.set(withdrawal_queue);
        self.env().emit_event(WithdrawalQueueChanged { withdrawal_queue });
    }

    /// Wire or replace the ratio feed (owner only).
    pub fn set_ratio_feed(&mut self, ratio_feed: Address) {
        self.only_owner();
        self.ratio_feed.set(ratio_feed);
        self.env().emit_event(RatioFeedChanged { ratio_feed });
    }

    pub fn set_max_ratio_gap(&mut self, max_gap_bp: u64) {
        self.only_owner();
        if max_gap_bp > math::BASIS_POINTS {
            self.env().revert(VaultError::ParameterExceedsLimits);
        }
        self.max_ratio_gap_bp.set(max_gap_bp);
        self.env().emit_event(MaxRatioGapChanged { max_gap_bp });
    }

    pub fn set_target_flash_capacity(&mut self, target: U256) {
        self.only_owner();
        let old_target = self.target_capacity.get_or_default();
        self.target_capacity.set(target);
        self.env().emit_event(TargetCapacityChanged {
            old_target,
            new_target: target,
        });
    }

    pub fn set_deposit_bonus_params(
        &mut self,
        max_bonus_rate: U256,
        optimal_bonus_rate: U256,
        deposit_utilization_kink: U256,
    ) {
        self.only_owner();
        let params = DepositBonusParams {
            max_bonus_rate,
            optimal_bonus_rate,
            deposit_utilization_kink,
        };
        if !params.is_valid() {
            self.env().revert(VaultError::ParameterExceedsLimits);
        }
        self.deposit_bonus_params.set(params);
        self.env().emit_event(DepositBonusParamsChanged {
            max_bonus_rate,
            optimal_bonus_rate,
            deposit_utilization_kink,
        });
    }

    pub fn set_flash_withdraw_fee_params(
        &mut self,
        max_flash_fee_rate: U256,
        optimal_withdrawal_rate: U256,
        withdraw_utilization_kink: U256,
    ) {
        self.only_owner();
        let params = FlashFeeParams {
            max_flash_fee_rate,
            optimal_withdrawal_rate,
            withdraw_utilization_kink,
        };
        if !params.is_valid() {
            self.env().revert(VaultError::ParameterExceedsLimits);
        }
        self.flash_fee_params.set(params);
        self.env().emit_event(FlashFeeParamsChanged {
            max_flash_fee_rate,
            optimal_withdrawal_rate,
            withdraw_utilization_kink,
        });
    }

    pub fn set_min_deposit(&mut self, amount: U256) {
        self.only_owner();
        if amount.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        self.min_deposit.set(amount);
        self.env().emit_event(MinDepositChanged { amount });
    }

    pub fn set_min_withdraw(&mut self, amount: U256) {
        self.only_owner();
        if amount.is_zero() {
            self.env().revert(VaultError::ValueZero);
        }
        self.min_withdraw.set(amount);
        self.env().emit_event(MinWithdrawChanged { amount });
    }

    pub fn set_operator(&mut self, operator: Address) {
        self.only_owner();
        self.operator.set(operator);
        self.env().emit_event(OperatorChanged { operator });
    }

    pub fn set_treasury(&mut self, treasury: Address) {
        self.only_owner();
        self.treasury.set(treasury);
        self.env().emit_event(TreasuryChanged { treasury });
    }

    pub fn pause(&mut self) {
        self.only_owner();
        self.paused.set(true);
        self.env().emit_event(ContractPaused {
            paused_by: self.env().caller(),
        });
    }

    pub fn unpause(&mut self) {
        self.only_owner();
        self.paused.set(false);
        self.env().emit_event(ContractUnpaused {
            unpaused_by: self.env().caller(),
        });
    }

    // ========================================
    // Internal helpers
    // ========================================

    /// Shares outstanding over backing, 1:1 while either side is empty.
    fn local_ratio(&self) -> U256 {
        let supply = self.claim_ref().total_supply();

        let assets = self.free_balance.get_or_default()
            + self.total_delegated.get_or_default()
            + self.total_pending_withdrawals.get_or_default()
            + self.total_pending_emergency.get_or_default();
        let owed = match self.withdrawal_queue.get() {
            Some(_) => self.queue_ref().get_total_requested_pending(),
            None => U256::zero(),
        };
        let backing = if assets > owed {
            assets - owed
        } else {
            U256::zero()
        };

        math::ratio_of(supply, backing)
    }

    /// Applies the vault-side bookkeeping of a settled epoch exactly once:
    /// releases the in-transit amounts and reclaims any over-delivery the
    /// queue sent back.
    fn sync_settled_epoch(&mut self, epoch_id: u64) {
        if self.epoch_synced.get(&epoch_id).unwrap_or(false) {
            return;
        }

        let info = match self.queue_ref().get_epoch_info(epoch_id) {
            Some(info) => info,
            None => return,
        };
        if !matches!(info.state, EpochState::Claimable) {
            return;
        }
        self.epoch_synced.set(&epoch_id, true);

        let in_transit = info.covered_amount + info.undelegated_amount;
        let pending = self.total_pending_withdrawals.get_or_default();
        self.total_pending_withdrawals.set(pending - in_transit);

        let gross = info.covered_amount + info.claimed_amount;
        let excess = gross - info.settled_amount;
        if !excess.is_zero() {
            let free = self.free_balance.get_or_default();
            self.free_balance.set(free + excess);
        }
    }

    fn asset_ref(&self) -> Cep18TokenContractRef {
        let address = self
            .asset_token
            .get_or_revert_with(VaultError::InvalidAddress);
        Cep18TokenContractRef::new(self.env(), address)
    }

    fn claim_ref(&self) -> ClaimTokenContractRef {
        let address = self
            .claim_token
            .get_or_revert_with(VaultError::InvalidAddress);
        ClaimTokenContractRef::new(self.env(), address)
    }

    fn queue_address(&self) -> Address {
        self.withdrawal_queue
            .get_or_revert_with(VaultError::InvalidAddress)
    }

    fn queue_ref(&self) -> WithdrawalQueueContractRef {
        WithdrawalQueueContractRef::new(self.env(), self.queue_address())
    }

    fn bonus_params(&self) -> DepositBonusParams {
        self.deposit_bonus_params
            .get_or_revert_with(VaultError::ParameterExceedsLimits)
    }

    fn fee_params(&self) -> FlashFeeParams {
        self.flash_fee_params
            .get_or_revert_with(VaultError::ParameterExceedsLimits)
    }

    fn ensure_registered(&self, adapter: Address) {
        if !self.adapter_registered.get(&adapter).unwrap_or(false) {
            self.env().revert(VaultError::AdapterNotRegistered);
        }
    }

    fn only_owner(&self) {
        let caller = self.env().caller();
        let owner = self.owner.get_or_revert_with(VaultError::OnlyOwnerAllowed);
        if caller != owner {
            self.env().revert(VaultError::OnlyOwnerAllowed);
        }
    }

    fn only_operator(&self) {
        let caller = self.env().caller();
        let operator = self
            .operator
            .get_or_revert_with(VaultError::OnlyOperatorAllowed);
        if caller != operator {
            self.env().revert(VaultError::OnlyOperatorAllowed);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(VaultError::ContractPaused);
        }
    }
}
