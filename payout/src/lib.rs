//! Payout computation for bakepay.
//!
//! - [`calculator::compute`] turns one delegator's stake into a [`DelegationEarning`]
//! - [`PayoutAssembler`] fans the calculator out over a cycle's delegators
//! - [`PayoutFilter`] drops transfers that should not be sent
//!
//! [`DelegationEarning`]: bakepay_types::DelegationEarning

pub mod assembler;
pub mod calculator;
pub mod config;
pub mod error;
pub mod filter;
pub mod report;

pub use assembler::{bounded, PayoutAssembler};
pub use calculator::compute;
pub use config::{AssemblerConfig, EarningsOrder, FailurePolicy};
pub use error::{LookupFailure, PayoutError, Subject};
pub use filter::{Exclusion, PayoutFilter};
pub use report::{PayoutReport, Submission};
