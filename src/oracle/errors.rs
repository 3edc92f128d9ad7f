//! Error definitions for the ratio feed.
use odra::prelude::*;

/// Errors raised by the RatioFeed contract
#[odra::odra_error]
pub enum OracleError {
    /// Caller is not the authorized publisher
    OnlyPublisherAllowed = 400,

    /// Caller is not the feed owner
    OnlyOwnerAllowed = 401,

    /// A published ratio was zero
    ValueZero = 402,

    /// Token and ratio arrays differ in length
    NullParams = 403,

    /// New ratio deviates from the stored one beyond the threshold
    RatioThresholdExceeded = 404,

    /// Configured threshold exceeds 100%
    ThresholdExceedsLimits = 405,
}
