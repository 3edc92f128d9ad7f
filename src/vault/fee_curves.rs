//! Deposit bonus and flash withdrawal fee curves.
//!
//! Both curves are two-segment piecewise-linear functions of flash-capacity
//! utilization (current flash balance over the target capacity):
//!
//! - Deposit bonus: rate falls linearly from `max_bonus_rate` at zero
//!   utilization to `optimal_bonus_rate` at the kink, stays flat until the
//!   target is reached, and is zero above it.
//! - Flash fee: rate is flat `optimal_withdrawal_rate` at or above the kink
//!   and climbs linearly to `max_flash_fee_rate` as the remaining balance
//!   approaches zero.
//!
//! An operation that traverses a utilization interval pays the integral of
//! the rate over that interval; the sloped segment uses the midpoint rule,
//! which is exact for a linear rate.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::math::ratio_scale;

/// Parameters of the deposit bonus curve. All rates and the kink are
/// 1e18-scaled (1e18 = 100%).
#[odra::odra_type]
pub struct DepositBonusParams {
    /// Bonus rate at zero utilization
    pub max_bonus_rate: U256,
    /// Bonus rate between the kink and the target
    pub optimal_bonus_rate: U256,
    /// Utilization at which the sloped segment ends
    pub deposit_utilization_kink: U256,
}

impl DepositBonusParams {
    /// 1.5% max, 0.25% optimal, kink at 25% utilization.
    pub fn default_params() -> Self {
        let scale = ratio_scale();
        Self {
            max_bonus_rate: scale * U256::from(15u64) / U256::from(1000u64),
            optimal_bonus_rate: scale * U256::from(25u64) / U256::from(10_000u64),
            deposit_utilization_kink: scale / U256::from(4u64),
        }
    }

    pub fn is_valid(&self) -> bool {
        let scale = ratio_scale();
        self.max_bonus_rate <= scale
            && self.optimal_bonus_rate <= self.max_bonus_rate
            && !self.deposit_utilization_kink.is_zero()
            && self.deposit_utilization_kink <= scale
    }
}

/// Parameters of the flash withdrawal fee curve. All rates and the kink are
/// 1e18-scaled (1e18 = 100%).
#[odra::odra_type]
pub struct FlashFeeParams {
    /// Fee rate as the remaining balance approaches zero
    pub max_flash_fee_rate: U256,
    /// Fee rate at or above the kink
    pub optimal_withdrawal_rate: U256,
    /// Utilization at which the sloped segment starts
    pub withdraw_utilization_kink: U256,
}

impl FlashFeeParams {
    /// 3% max, 0.5% optimal, kink at 25% utilization.
    pub fn default_params() -> Self {
        let scale = ratio_scale();
        Self {
            max_flash_fee_rate: scale * U256::from(30u64) / U256::from(1000u64),
            optimal_withdrawal_rate: scale * U256::from(5u64) / U256::from(1000u64),
            withdraw_utilization_kink: scale / U256::from(4u64),
        }
    }

    pub fn is_valid(&self) -> bool {
        let scale = ratio_scale();
        self.max_flash_fee_rate <= scale
            && self.optimal_withdrawal_rate <= self.max_flash_fee_rate
            && !self.optimal_withdrawal_rate.is_zero()
            && !self.withdraw_utilization_kink.is_zero()
            && self.withdraw_utilization_kink <= scale
    }
}

/// Bonus earned by a deposit that lifts the flash balance from `capacity`
/// towards the target. Zero once the target is reached; the caller caps the
/// result by the available bonus pool.
pub fn calculate_deposit_bonus(
    amount: U256,
    capacity: U256,
    target_capacity: U256,
    params: &DepositBonusParams,
) -> U256 {
    if amount.is_zero() || target_capacity.is_zero() {
        return U256::zero();
    }

    let scale = ratio_scale();
    let kink_point = target_capacity * params.deposit_utilization_kink / scale;

    let mut bonus = U256::zero();
    let mut remaining = amount;
    let mut cap = capacity;

    // Sloped segment below the kink.
    if cap < kink_point {
        let replenished = core::cmp::min(remaining, kink_point - cap);
        let midpoint = cap + replenished / U256::from(2u64);
        let rate_drop =
            (params.max_bonus_rate - params.optimal_bonus_rate) * midpoint / kink_point;
        let rate = params.max_bonus_rate - rate_drop;
        bonus += replenished * rate / scale;
        cap += replenished;
        remaining -= replenished;
    }

    // Flat segment between the kink and the target.
    if !remaining.is_zero() && cap < target_capacity {
        let replenished = core::cmp::min(remaining, target_capacity - cap);
        bonus += replenished * params.optimal_bonus_rate / scale;
    }

    bonus
}

/// Fee charged by an instant withdrawal that drops the flash balance from
/// `capacity` by `amount`. Strictly positive for any positive amount under
/// valid parameters; any portion beyond the available balance is charged at
/// the maximum rate.
pub fn calculate_flash_withdraw_fee(
    amount: U256,
    capacity: U256,
    target_capacity: U256,
    params: &FlashFeeParams,
) -> U256 {
    if amount.is_zero() {
        return U256::zero();
    }

    let scale = ratio_scale();
    if target_capacity.is_zero() {
        return amount * params.max_flash_fee_rate / scale;
    }

    let kink_point = target_capacity * params.withdraw_utilization_kink / scale;

    let mut fee = U256::zero();
    let mut remaining = amount;
    let mut cap = capacity;

    // Flat segment above the kink.
    if cap > kink_point {
        let portion = core::cmp::min(remaining, cap - kink_point);
        fee += portion * params.optimal_withdrawal_rate / scale;
        cap -= portion;
        remaining -= portion;
    }

    // Sloped segment below the kink.
    if !remaining.is_zero() {
        let portion = core::cmp::min(remaining, cap);
        if !portion.is_zero() {
            let rate = if kink_point.is_zero() {
                params.max_flash_fee_rate
            } else {
                let midpoint = cap - portion / U256::from(2u64);
                let climb = (params.max_flash_fee_rate - params.optimal_withdrawal_rate)
                    * (kink_point - midpoint)
                    / kink_point;
                params.optimal_withdrawal_rate + climb
            };
            fee += portion * rate / scale;
            remaining -= portion;
        }
    }

    if !remaining.is_zero() {
        fee += remaining * params.max_flash_fee_rate / scale;
    }

    fee
}
