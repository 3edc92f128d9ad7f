//! Shared fixed-point math for the vault suite.
//!
//! All ratios and rate parameters are scaled by 1e18. The ratio is the number
//! of claim-token shares backing one unit of the underlying asset, so an
//! empty vault sits at exactly `RATIO_SCALE` and the ratio rises when backing
//! is lost to slashing.

use odra::casper_types::U256;

/// Scale for ratios and rate percentages (1e18 = 1.0 / 100%).
pub const RATIO_SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator used by deviation guards.
pub const BASIS_POINTS: u64 = 10_000;

/// Returns the 1e18 scale as a `U256`.
pub fn ratio_scale() -> U256 {
    U256::from(RATIO_SCALE)
}

/// Converts an asset amount to claim-token shares at the given ratio.
///
/// `shares = amount * ratio / 1e18`, rounding down.
pub fn convert_to_shares(amount: U256, ratio: U256) -> U256 {
    (amount * ratio) / ratio_scale()
}

/// Converts claim-token shares to an asset amount at the given ratio.
///
/// `amount = shares * 1e18 / ratio`, rounding down. A zero ratio yields zero.
pub fn convert_to_assets(shares: U256, ratio: U256) -> U256 {
    if ratio.is_zero() {
        return U256::zero();
    }
    (shares * ratio_scale()) / ratio
}

/// Locally computable ratio: shares outstanding per unit of backing.
///
/// Falls back to 1:1 while the vault is empty on either side.
pub fn ratio_of(total_shares: U256, backing: U256) -> U256 {
    if total_shares.is_zero() || backing.is_zero() {
        return ratio_scale();
    }
    (total_shares * ratio_scale()) / backing
}

/// `amount * numerator / denominator`, rounding down; zero denominator yields
/// zero. Used for pro-rata epoch settlement.
pub fn mul_div(amount: U256, numerator: U256, denominator: U256) -> U256 {
    if denominator.is_zero() {
        return U256::zero();
    }
    (amount * numerator) / denominator
}

/// Relative deviation of `value` from `reference` in basis points.
///
/// A zero reference is treated as infinitely distant unless `value` is also
/// zero.
pub fn deviation_bp(value: U256, reference: U256) -> u64 {
    if reference.is_zero() {
        return if value.is_zero() { 0 } else { u64::MAX };
    }
    let diff = if value > reference {
        value - reference
    } else {
        reference - value
    };
    let bp = (diff * U256::from(BASIS_POINTS)) / reference;
    if bp > U256::from(u64::MAX) {
        u64::MAX
    } else {
        bp.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::from(RATIO_SCALE)
    }

    #[test]
    fn test_conversion_round_trip_at_par() {
        let amount = eth(10);
        let shares = convert_to_shares(amount, ratio_scale());
        assert_eq!(shares, amount);
        assert_eq!(convert_to_assets(shares, ratio_scale()), amount);
    }

    #[test]
    fn test_conversion_after_loss() {
        // 20 shares backed by 19 assets: ratio > 1e18
        let ratio = ratio_of(eth(20), eth(19));
        let amount = convert_to_assets(eth(10), ratio);
        // 10 shares now claim 9.5 assets
        assert_eq!(amount, eth(19) / U256::from(2));
    }

    #[test]
    fn test_ratio_of_empty_vault() {
        assert_eq!(ratio_of(U256::zero(), eth(5)), ratio_scale());
        assert_eq!(ratio_of(eth(5), U256::zero()), ratio_scale());
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(
            mul_div(eth(10), eth(9), eth(10)),
            eth(9)
        );
        assert_eq!(mul_div(eth(10), eth(1), U256::zero()), U256::zero());
    }

    #[test]
    fn test_deviation_bp() {
        assert_eq!(deviation_bp(eth(100), eth(100)), 0);
        // 105 vs 100 -> 500 bp
        assert_eq!(deviation_bp(eth(105), eth(100)), 500);
        // 95 vs 100 -> 500 bp
        assert_eq!(deviation_bp(eth(95), eth(100)), 500);
        assert_eq!(deviation_bp(eth(1), U256::zero()), u64::MAX);
        assert_eq!(deviation_bp(U256::zero(), U256::zero()), 0);
    }
}
