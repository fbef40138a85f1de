//! Fundamental types for bakepay.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! amounts, fee rates, chain snapshots, per-delegator earnings and cycle payouts.

pub mod amount;
pub mod chain;
pub mod earning;
pub mod error;
pub mod fee;
pub mod operation;

pub use amount::Mutez;
pub use chain::{BlockHead, CycleInfo, FrozenRewards, NetworkConstants};
pub use earning::{DelegationEarning, DelegationEarnings, Payout};
pub use error::InvariantViolation;
pub use fee::FeeRate;
pub use operation::OperationParams;

/// A cycle number on the underlying chain.
pub type Cycle = u32;
