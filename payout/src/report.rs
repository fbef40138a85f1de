use bakepay_types::{Cycle, Mutez};

use crate::PayoutError;

/// Successful result of processing one payout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was left to pay after filtering.
    NothingToPay,
    Injected {
        operation_hash: String,
        transfers: usize,
        total_amount: Mutez,
    },
}

/// Emitted exactly once for every processed payout.
#[derive(Clone, Debug, PartialEq)]
pub struct PayoutReport {
    pub cycle: Cycle,
    pub outcome: Result<Submission, PayoutError>,
}

impl PayoutReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn operation_hash(&self) -> Option<&str> {
        match &self.outcome {
            Ok(Submission::Injected { operation_hash, .. }) => Some(operation_hash),
            _ => None,
        }
    }
}
