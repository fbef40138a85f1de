//! Arithmetic invariants shared by the payout and forging paths.

use thiserror::Error;

use crate::{Cycle, Mutez};

/// A broken arithmetic invariant. Always fatal for the payout it concerns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("division by zero: staking balance is zero while computing share for {delegator}")]
    DivisionByZero { delegator: String },

    #[error("stake of {delegator} ({stake}) exceeds the delegate staking balance ({staking_balance})")]
    StakeExceedsStakingBalance {
        delegator: String,
        stake: Mutez,
        staking_balance: Mutez,
    },

    #[error("cycle {cycle}: allocated {allocated} mutez but only {available} are available")]
    RewardsOverallocated {
        cycle: Cycle,
        allocated: Mutez,
        available: Mutez,
    },

    #[error("fee rate {rate} is outside [0, 1]")]
    FeeRateOutOfRange { rate: f64 },

    #[error("counter space exhausted after {counter}")]
    CounterOverflow { counter: u64 },
}
