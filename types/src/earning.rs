//! Per-delegator earnings and the per-cycle payout aggregate.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::{Cycle, Mutez};

/// One delegator's computed reward for one cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelegationEarning {
    /// Delegator address (`tz1…`, `tz2…`, `tz3…` or `KT1…`).
    pub delegator: String,
    pub fee: Mutez,
    pub gross_rewards: Mutez,
    /// `gross_rewards - fee`.
    pub net_rewards: Mutez,
    /// Stake divided by staking balance. Informational only.
    pub share: f64,
}

/// Ordered list of earnings. Order fixes counter assignment when forging.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelegationEarnings(Vec<DelegationEarning>);

impl DelegationEarnings {
    pub fn new(earnings: Vec<DelegationEarning>) -> Self {
        Self(earnings)
    }

    pub fn into_inner(self) -> Vec<DelegationEarning> {
        self.0
    }

    /// Sort by delegator address for reproducible ordering.
    pub fn sort_by_address(&mut self) {
        self.0.sort_by(|a, b| a.delegator.cmp(&b.delegator));
    }

    pub fn retain<F: FnMut(&DelegationEarning) -> bool>(&mut self, f: F) {
        self.0.retain(f);
    }

    pub fn total_gross(&self) -> Mutez {
        self.0.iter().map(|e| &e.gross_rewards).sum()
    }

    pub fn total_net(&self) -> Mutez {
        self.0.iter().map(|e| &e.net_rewards).sum()
    }

    pub fn total_fee(&self) -> Mutez {
        self.0.iter().map(|e| &e.fee).sum()
    }
}

impl Deref for DelegationEarnings {
    type Target = [DelegationEarning];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<DelegationEarning>> for DelegationEarnings {
    fn from(v: Vec<DelegationEarning>) -> Self {
        Self(v)
    }
}

impl FromIterator<DelegationEarning> for DelegationEarnings {
    fn from_iter<I: IntoIterator<Item = DelegationEarning>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DelegationEarnings {
    type Item = DelegationEarning;
    type IntoIter = std::vec::IntoIter<DelegationEarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Everything owed by one delegate for one cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub delegation_earnings: DelegationEarnings,
    pub cycle: Cycle,
    /// Frozen rewards distributed in this payout.
    pub frozen_balance: Mutez,
    pub staking_balance: Mutez,
    pub delegate: String,
}

impl Payout {
    pub fn is_empty(&self) -> bool {
        self.delegation_earnings.is_empty()
    }
}
