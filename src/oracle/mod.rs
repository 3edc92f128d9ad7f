//! Ratio feed oracle.
//!
//! The feed publishes a vetted shares-per-asset ratio for each claim token.
//! Once published it is the authoritative ratio for the vault, which keeps a
//! consumer-side deviation guard against its own locally computable bound.

pub mod ratio_feed;
pub mod errors;
pub mod events;

pub use ratio_feed::RatioFeed;
pub use errors::OracleError;

use odra::casper_types::U256;
use crate::math;

/// Reconciles a published ratio with the locally computable bound.
///
/// The published value wins, except when it overshoots the local bound by
/// more than `max_gap_bp` basis points. An overstated ratio would let
/// depositors mint shares against backing that was never lost, so the result
/// is clamped to `local * (10000 + max_gap_bp) / 10000`. A zero published
/// ratio means "never published" and yields the local bound.
pub fn reconcile_ratio(local: U256, published: U256, max_gap_bp: u64) -> U256 {
    if published.is_zero() {
        return local;
    }
    let cap = (local * U256::from(math::BASIS_POINTS + max_gap_bp))
        / U256::from(math::BASIS_POINTS);
    if published > cap {
        cap
    } else {
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio_scale;

    fn bp(ratio: U256, points: u64) -> U256 {
        ratio * U256::from(10_000 + points) / U256::from(10_000u64)
    }

    #[test]
    fn test_unpublished_falls_back_to_local() {
        let local = ratio_scale();
        assert_eq!(reconcile_ratio(local, U256::zero(), 500), local);
    }

    #[test]
    fn test_published_within_gap_is_authoritative() {
        let local = ratio_scale();
        let published = bp(local, 300);
        assert_eq!(reconcile_ratio(local, published, 500), published);
        // A published ratio below local is always accepted: it only makes
        // shares more expensive to mint.
        let low = local / U256::from(2);
        assert_eq!(reconcile_ratio(local, low, 500), low);
    }

    #[test]
    fn test_published_beyond_gap_is_clamped() {
        let local = ratio_scale();
        let published = bp(local, 900);
        assert_eq!(reconcile_ratio(local, published, 500), bp(local, 500));
    }

    #[test]
    fn test_exact_gap_boundary() {
        let local = ratio_scale();
        let published = bp(local, 500);
        assert_eq!(reconcile_ratio(local, published, 500), published);
    }
}
