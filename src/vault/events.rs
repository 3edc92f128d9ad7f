//! Event definitions for the vault ledger.
use odra::prelude::*;
use odra::casper_types::U256;

/// Emitted when assets are deposited and shares minted
#[odra::event]
pub struct Deposit {
    /// Depositing account
    pub sender: Address,
    /// Receiver of the minted shares
    pub receiver: Address,
    /// Assets pulled from the sender
    pub amount: U256,
    /// Shares minted
    pub shares: U256,
}

/// Emitted when a deposit earns a replenishment bonus from the pool
#[odra::event]
pub struct DepositBonus {
    /// Bonus credited on top of the deposited amount
    pub amount: U256,
}

/// Emitted when a withdrawal request is enqueued
#[odra::event]
pub struct Withdraw {
    /// Requesting account
    pub sender: Address,
    /// Receiver of the eventual payout
    pub receiver: Address,
    /// Owner of the burned shares
    pub owner: Address,
    /// Asset amount fixed at request time
    pub amount: U256,
    /// Shares burned
    pub shares: U256,
    /// Epoch the request landed in
    pub epoch: u64,
}

/// Emitted on an instant fee-bearing withdrawal
#[odra::event]
pub struct FlashWithdraw {
    /// Requesting account
    pub sender: Address,
    /// Receiver of the assets
    pub receiver: Address,
    /// Owner of the burned shares
    pub owner: Address,
    /// Gross asset amount
    pub amount: U256,
    /// Shares burned
    pub shares: U256,
    /// Fee charged
    pub fee: U256,
}

/// Emitted alongside FlashWithdraw with the fee split into the pool
#[odra::event]
pub struct WithdrawalFee {
    /// Total fee charged
    pub fee: U256,
}

/// Emitted when a settled withdrawal is paid out
#[odra::event]
pub struct Redeem {
    /// Calling account
    pub sender: Address,
    /// Paid receiver
    pub receiver: Address,
    /// Amount paid
    pub amount: U256,
}

/// Emitted when free balance is delegated through an adapter
#[odra::event]
pub struct DelegatedTo {
    /// Adapter contract
    pub adapter: Address,
    /// Delegation target
    pub target: Address,
    /// Amount delegated
    pub amount: U256,
}

/// Emitted per adapter entry when an epoch is undelegated
#[odra::event]
pub struct UndelegatedFrom {
    /// Adapter contract
    pub adapter: Address,
    /// Delegation target
    pub target: Address,
    /// Epoch being settled
    pub epoch: u64,
    /// Actual amount the adapter queued
    pub actual_amount: U256,
}

/// Emitted when an epoch's amounts are fixed and the queue rolls over
#[odra::event]
pub struct EpochAdvanced {
    /// The epoch that left the open state
    pub epoch: u64,
    /// Total requested in the epoch
    pub requested_amount: U256,
    /// Portion covered directly from free balance
    pub covered_amount: U256,
}

/// Emitted when capital is pulled out-of-band
#[odra::event]
pub struct EmergencyUndelegated {
    /// Adapter contract
    pub adapter: Address,
    /// Delegation target
    pub target: Address,
    /// Amount queued out-of-band
    pub amount: U256,
}

/// Emitted when emergency funds land back in the free balance
#[odra::event]
pub struct EmergencyClaimed {
    /// Adapter contract
    pub adapter: Address,
    /// Amount recovered
    pub amount: U256,
}

/// Emitted when the cached delegation total is refreshed
#[odra::event]
pub struct TotalDelegatedUpdated {
    /// New cached total
    pub total: U256,
}

/// Emitted when an adapter is registered
#[odra::event]
pub struct AdapterAdded {
    /// Adapter contract
    pub adapter: Address,
}

/// Emitted when the flash capacity target changes
#[odra::event]
pub struct TargetCapacityChanged {
    /// Old target
    pub old_target: U256,
    /// New target
    pub new_target: U256,
}

/// Emitted when deposit bonus curve parameters change
#[odra::event]
pub struct DepositBonusParamsChanged {
    /// New maximum bonus rate
    pub max_bonus_rate: U256,
    /// New optimal bonus rate
    pub optimal_bonus_rate: U256,
    /// New utilization kink
    pub deposit_utilization_kink: U256,
}

/// Emitted when flash fee curve parameters change
#[odra::event]
pub struct FlashFeeParamsChanged {
    /// New maximum fee rate
    pub max_flash_fee_rate: U256,
    /// New optimal fee rate
    pub optimal_withdrawal_rate: U256,
    /// New utilization kink
    pub withdraw_utilization_kink: U256,
}

/// Emitted when the minimum deposit changes
#[odra::event]
pub struct MinDepositChanged {
    /// New minimum
    pub amount: U256,
}

/// Emitted when the minimum withdrawal changes
#[odra::event]
pub struct MinWithdrawChanged {
    /// New minimum
    pub amount: U256,
}

/// Emitted when the operator account changes
#[odra::event]
pub struct OperatorChanged {
    /// New operator
    pub operator: Address,
}

/// Emitted when the treasury account changes
#[odra::event]
pub struct TreasuryChanged {
    /// New treasury
    pub treasury: Address,
}

/// Emitted when the ratio feed is wired or replaced
#[odra::event]
pub struct RatioFeedChanged {
    /// New feed contract
    pub ratio_feed: Address,
}

/// Emitted when the oracle deviation guard changes
#[odra::event]
pub struct MaxRatioGapChanged {
    /// New gap in basis points
    pub max_gap_bp: u64,
}

/// Emitted when the withdrawal queue is wired
#[odra::event]
pub struct WithdrawalQueueChanged {
    /// New queue contract
    pub withdrawal_queue: Address,
}

/// Emitted when the vault is paused
#[odra::event]
pub struct ContractPaused {
    /// Pausing owner
    pub paused_by: Address,
}

/// Emitted when the vault is unpaused
#[odra::event]
pub struct ContractUnpaused {
    /// Unpausing owner
    pub unpaused_by: Address,
}
