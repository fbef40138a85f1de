//! Transfer exclusion rules, applied after calculation and before forging.

use std::collections::HashSet;
use std::fmt;

use bakepay_types::{DelegationEarning, DelegationEarnings, Mutez, Payout};

/// Why an earning was left out of the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exclusion {
    SelfPayment,
    Blacklisted,
    ZeroAmount,
    BelowMinimum,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SelfPayment => "delegate's own address",
            Self::Blacklisted => "blacklisted",
            Self::ZeroAmount => "zero net reward",
            Self::BelowMinimum => "below minimum payment",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct PayoutFilter {
    delegate: String,
    minimum_payment: Mutez,
    blacklist: HashSet<String>,
}

impl PayoutFilter {
    pub fn new<S: Into<String>>(
        delegate: impl Into<String>,
        minimum_payment: impl Into<Mutez>,
        blacklist: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            delegate: delegate.into(),
            minimum_payment: minimum_payment.into(),
            blacklist: blacklist.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exclusion(&self, earning: &DelegationEarning) -> Option<Exclusion> {
        if earning.delegator == self.delegate {
            Some(Exclusion::SelfPayment)
        } else if self.blacklist.contains(&earning.delegator) {
            Some(Exclusion::Blacklisted)
        } else if earning.net_rewards.is_zero() {
            Some(Exclusion::ZeroAmount)
        } else if earning.net_rewards < self.minimum_payment {
            Some(Exclusion::BelowMinimum)
        } else {
            None
        }
    }

    /// The payable part of `payout`, plus every excluded delegator and why.
    pub fn apply(&self, payout: &Payout) -> (Payout, Vec<(String, Exclusion)>) {
        let mut excluded = Vec::new();
        let mut kept = Vec::with_capacity(payout.delegation_earnings.len());
        for earning in payout.delegation_earnings.iter() {
            match self.exclusion(earning) {
                Some(reason) => excluded.push((earning.delegator.clone(), reason)),
                None => kept.push(earning.clone()),
            }
        }
        let filtered = Payout {
            delegation_earnings: DelegationEarnings::new(kept),
            ..payout.clone()
        };
        (filtered, excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earning(delegator: &str, net: u64) -> DelegationEarning {
        DelegationEarning {
            delegator: delegator.to_string(),
            fee: Mutez::zero(),
            gross_rewards: Mutez::from(net),
            net_rewards: Mutez::from(net),
            share: 0.0,
        }
    }

    fn payout(earnings: Vec<DelegationEarning>) -> Payout {
        Payout {
            delegation_earnings: DelegationEarnings::new(earnings),
            cycle: 100,
            frozen_balance: Mutez::from(1_000u64),
            staking_balance: Mutez::from(1_000u64),
            delegate: "tz1baker".into(),
        }
    }

    #[test]
    fn each_rule_applies() {
        let filter = PayoutFilter::new("tz1baker", 10u64, ["tz1banned"]);
        let (kept, excluded) = filter.apply(&payout(vec![
            earning("tz1baker", 500),
            earning("tz1banned", 500),
            earning("tz1zero", 0),
            earning("tz1small", 9),
            earning("tz1exact", 10),
            earning("tz1big", 400),
        ]));
        let addresses: Vec<_> =
            kept.delegation_earnings.iter().map(|e| e.delegator.as_str()).collect();
        assert_eq!(addresses, ["tz1exact", "tz1big"]);
        assert_eq!(
            excluded,
            vec![
                ("tz1baker".to_string(), Exclusion::SelfPayment),
                ("tz1banned".to_string(), Exclusion::Blacklisted),
                ("tz1zero".to_string(), Exclusion::ZeroAmount),
                ("tz1small".to_string(), Exclusion::BelowMinimum),
            ]
        );
    }

    #[test]
    fn keeps_cycle_metadata_and_order() {
        let filter = PayoutFilter::new("tz1baker", 0u64, Vec::<String>::new());
        let original = payout(vec![earning("tz1b", 2), earning("tz1a", 1)]);
        let (kept, excluded) = filter.apply(&original);
        assert!(excluded.is_empty());
        assert_eq!(kept, original);
    }

    #[test]
    fn everything_filtered_is_empty_payout() {
        let filter = PayoutFilter::new("tz1baker", 1_000u64, Vec::<String>::new());
        let (kept, excluded) = filter.apply(&payout(vec![earning("tz1a", 1), earning("tz1b", 2)]));
        assert!(kept.is_empty());
        assert_eq!(excluded.len(), 2);
    }
}
