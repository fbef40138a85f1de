//! Assembler configuration.

use std::time::Duration;

use bakepay_types::FeeRate;
use serde::{Deserialize, Serialize};

/// What to do when one delegator's earning cannot be computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole cycle.
    #[default]
    FailFast,
    /// Log the delegator and leave it out of the payout.
    SkipFailed,
}

/// Order of earnings (and therefore counters) in an assembled payout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningsOrder {
    /// By delegator address.
    #[default]
    Sorted,
    /// As the node listed the delegators.
    Listing,
}

#[derive(Clone, Debug)]
pub struct AssemblerConfig {
    pub delegate: String,
    pub fee_rate: FeeRate,
    pub failure_policy: FailurePolicy,
    pub earnings_order: EarningsOrder,
    /// Bound on every single node call.
    pub call_timeout: Duration,
}

impl AssemblerConfig {
    pub fn new(delegate: impl Into<String>, fee_rate: FeeRate) -> Self {
        Self {
            delegate: delegate.into(),
            fee_rate,
            failure_policy: FailurePolicy::default(),
            earnings_order: EarningsOrder::default(),
            call_timeout: Duration::from_secs(10),
        }
    }
}
