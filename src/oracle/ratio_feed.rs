//! Ratio feed contract.
//!
//! A designated publisher pushes smoothed, off-chain-verified ratios for the
//! claim tokens it serves. Every update is checked against the previously
//! stored value: a jump beyond the configured threshold is rejected, so a
//! single bad publication cannot move the ratio arbitrarily.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::math;
use super::errors::OracleError;
use super::events::{RatioUpdated, RatioThresholdChanged, PublisherChanged};

/// Default per-update deviation threshold: 5%.
pub const DEFAULT_RATIO_THRESHOLD_BP: u64 = 500;

/// Ratio feed contract
#[odra::module]
pub struct RatioFeed {
    /// Feed owner
    owner: Var<Address>,
    /// Account authorized to publish ratios
    publisher: Var<Address>,
    /// Latest published ratio per claim token
    ratios: Mapping<Address, U256>,
    /// Publication timestamp per claim token
    updated_at: Mapping<Address, u64>,
    /// Maximum relative deviation per update, in basis points
    ratio_threshold_bp: Var<u64>,
}

#[odra::module]
impl RatioFeed {
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.owner.set(caller);
        self.publisher.set(caller);
        self.ratio_threshold_bp.set(DEFAULT_RATIO_THRESHOLD_BP);
    }

    /// Publish ratios for a batch of claim tokens.
    ///
    /// The first publication for a token is accepted as-is; later updates
    /// must stay within the deviation threshold of the stored value.
    pub fn update_ratio_batch(&mut self, tokens: Vec<Address>, ratios: Vec<U256>) {
        self.only_publisher();

        if tokens.len() != ratios.len() {
            self.env().revert(OracleError::NullParams);
        }

        let threshold = self.ratio_threshold_bp.get_or_default();
        for (token, ratio) in tokens.into_iter().zip(ratios.into_iter()) {
            if ratio.is_zero() {
                self.env().revert(OracleError::ValueZero);
            }

            let previous = self.ratios.get(&token).unwrap_or_default();
            if !previous.is_zero()
                && math::deviation_bp(ratio, previous) > threshold
            {
                self.env().revert(OracleError::RatioThresholdExceeded);
            }

            self.ratios.set(&token, ratio);
            self.updated_at.set(&token, self.env().get_block_time());

            self.env().emit_event(RatioUpdated {
                token,
                old_ratio: previous,
                new_ratio: ratio,
            });
        }
    }

    /// Latest published ratio for a token, zero if never published.
    pub fn get_ratio(&self, token: Address) -> U256 {
        self.ratios.get(&token).unwrap_or_default()
    }

    /// Timestamp of the latest publication for a token.
    pub fn get_ratio_updated_at(&self, token: Address) -> u64 {
        self.updated_at.get(&token).unwrap_or_default()
    }

    /// Per-update deviation threshold in basis points.
    pub fn get_ratio_threshold(&self) -> u64 {
        self.ratio_threshold_bp.get_or_default()
    }

    /// Update the deviation threshold (owner only).
    pub fn set_ratio_threshold(&mut self, threshold_bp: u64) {
        self.only_owner();
        if threshold_bp > math::BASIS_POINTS {
            self.env().revert(OracleError::ThresholdExceedsLimits);
        }

        let old_threshold = self.ratio_threshold_bp.get_or_default();
        self.ratio_threshold_bp.set(threshold_bp);

        self.env().emit_event(RatioThresholdChanged {
            old_threshold,
            new_threshold: threshold_bp,
        });
    }

    /// Change the publisher account (owner only).
    pub fn set_publisher(&mut self, publisher: Address) {
        self.only_owner();

        let old_publisher = self
            .publisher
            .get_or_revert_with(OracleError::OnlyOwnerAllowed);
        self.publisher.set(publisher);

        self.env().emit_event(PublisherChanged {
            old_publisher,
            new_publisher: publisher,
        });
    }

    pub fn get_publisher(&self) -> Address {
        self.publisher
            .get_or_revert_with(OracleError::OnlyPublisherAllowed)
    }

    // Internal helpers

    fn only_publisher(&self) {
        let caller = self.env().caller();
        let publisher = self
            .publisher
            .get_or_revert_with(OracleError::OnlyPublisherAllowed);
        if caller != publisher {
            self.env().revert(OracleError::OnlyPublisherAllowed);
        }
    }

    fn only_owner(&self) {
        let caller = self.env().caller();
        let owner = self.owner.get_or_revert_with(OracleError::OnlyOwnerAllowed);
        if caller != owner {
            self.env().revert(OracleError::OnlyOwnerAllowed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv, NoArgs};
    use crate::math::ratio_scale;

    fn setup() -> (HostEnv, RatioFeedHostRef, Address) {
        let env = odra_test::env();
        let feed = RatioFeed::deploy(&env, NoArgs);
        let token = env.get_account(9);
        (env, feed, token)
    }

    #[test]
    fn test_first_publication_accepted() {
        let (_, mut feed, token) = setup();
        assert_eq!(feed.get_ratio(token), U256::zero());

        let ratio = ratio_scale();
        feed.update_ratio_batch(vec![token], vec![ratio]);
        assert_eq!(feed.get_ratio(token), ratio);
    }

    #[test]
    fn test_update_within_threshold() {
        let (_, mut feed, token) = setup();
        let ratio = ratio_scale();
        feed.update_ratio_batch(vec![token], vec![ratio]);

        // +4% passes the default 5% threshold
        let next = ratio * U256::from(104u64) / U256::from(100u64);
        feed.update_ratio_batch(vec![token], vec![next]);
        assert_eq!(feed.get_ratio(token), next);
    }

    #[test]
    fn test_update_beyond_threshold_rejected() {
        let (_, mut feed, token) = setup();
        let ratio = ratio_scale();
        feed.update_ratio_batch(vec![token], vec![ratio]);

        let jump = ratio * U256::from(2u64);
        assert_eq!(
            feed.try_update_ratio_batch(vec![token], vec![jump]),
            Err(OracleError::RatioThresholdExceeded.into())
        );
        assert_eq!(feed.get_ratio(token), ratio);
    }

    #[test]
    fn test_zero_ratio_rejected() {
        let (_, mut feed, token) = setup();
        assert_eq!(
            feed.try_update_ratio_batch(vec![token], vec![U256::zero()]),
            Err(OracleError::ValueZero.into())
        );
    }

    #[test]
    fn test_mismatched_batch_rejected() {
        let (_, mut feed, token) = setup();
        assert_eq!(
            feed.try_update_ratio_batch(vec![token], vec![]),
            Err(OracleError::NullParams.into())
        );
    }

    #[test]
    fn test_only_publisher_may_update() {
        let (env, mut feed, token) = setup();
        env.set_caller(env.get_account(1));
        assert_eq!(
            feed.try_update_ratio_batch(vec![token], vec![ratio_scale()]),
            Err(OracleError::OnlyPublisherAllowed.into())
        );
    }

    #[test]
    fn test_threshold_validation() {
        let (_, mut feed, _) = setup();
        assert_eq!(
            feed.try_set_ratio_threshold(10_001),
            Err(OracleError::ThresholdExceedsLimits.into())
        );
        feed.set_ratio_threshold(1_000);
        assert_eq!(feed.get_ratio_threshold(), 1_000);
    }
}
