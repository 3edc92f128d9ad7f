//! Event definitions for the ratio feed.
use odra::prelude::*;
use odra::casper_types::U256;

/// Emitted on every accepted ratio publication
#[odra::event]
pub struct RatioUpdated {
    /// Claim token the ratio is published for
    pub token: Address,
    /// Previously stored ratio (zero on first publication)
    pub old_ratio: U256,
    /// Newly published ratio
    pub new_ratio: U256,
}

/// Emitted when the per-update deviation threshold changes
#[odra::event]
pub struct RatioThresholdChanged {
    /// Old threshold in basis points
    pub old_threshold: u64,
    /// New threshold in basis points
    pub new_threshold: u64,
}

/// Emitted when the publisher account changes
#[odra::event]
pub struct PublisherChanged {
    /// Old publisher
    pub old_publisher: Address,
    /// New publisher
    pub new_publisher: Address,
}
