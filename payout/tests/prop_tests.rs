use bakepay_payout::compute;
use bakepay_types::fee::PARTS_PER_BILLION;
use bakepay_types::{FeeRate, Mutez};
use num_bigint::BigUint;
use proptest::prelude::*;

fn rate() -> impl Strategy<Value = FeeRate> {
    (0..=PARTS_PER_BILLION).prop_map(|ppb| FeeRate::from_ppb(ppb).unwrap())
}

proptest! {
    #[test]
    fn per_delegator_bounds(
        stake in 0u64..=1_000_000_000_000,
        extra in 0u64..=1_000_000_000_000,
        rewards in any::<u64>(),
        fee_rate in rate(),
    ) {
        let staking_balance = Mutez::from(stake) + Mutez::from(extra).max(Mutez::from(1u64));
        let rewards = Mutez::from(rewards);
        let e = compute("tz1x", &Mutez::from(stake), &rewards, &staking_balance, fee_rate).unwrap();

        prop_assert!(e.gross_rewards <= rewards);
        prop_assert!(e.fee <= e.gross_rewards);
        prop_assert_eq!(&e.net_rewards + &e.fee, e.gross_rewards.clone());
        prop_assert!(e.share >= 0.0 && e.share <= 1.0);
    }

    #[test]
    fn distribution_never_exceeds_rewards(
        stakes in prop::collection::vec(0u64..=10_000_000_000, 1..40),
        spare in 0u64..=10_000_000_000,
        rewards in 0u64..=1_000_000_000_000,
        fee_rate in rate(),
    ) {
        let total_stake: u64 = stakes.iter().sum();
        let staking_balance = Mutez::from(total_stake + spare.max(1));
        let rewards = Mutez::from(rewards);

        let earnings: Vec<_> = stakes
            .iter()
            .map(|s| {
                compute("tz1x", &Mutez::from(*s), &rewards, &staking_balance, fee_rate).unwrap()
            })
            .collect();
        let gross: Mutez = earnings.iter().map(|e| &e.gross_rewards).sum();
        prop_assert!(gross <= rewards);

        // Truncation loses strictly less than one mutez per delegator.
        let exact =
            rewards.as_biguint() * BigUint::from(total_stake) / staking_balance.as_biguint();
        let lost = exact - gross.as_biguint();
        prop_assert!(lost < BigUint::from(stakes.len()));
    }

    #[test]
    fn fee_monotonic_in_rate(
        stake_amount in 1u64..=1_000_000,
        a in 0..=PARTS_PER_BILLION,
        b in 0..=PARTS_PER_BILLION,
    ) {
        let (lo, hi) = (a.min(b), a.max(b));
        let stake = Mutez::from(stake_amount);
        let rewards = Mutez::from(987_654_321u64);
        let (lo, hi) = (FeeRate::from_ppb(lo).unwrap(), FeeRate::from_ppb(hi).unwrap());
        let low = compute("tz1x", &stake, &rewards, &stake, lo).unwrap();
        let high = compute("tz1x", &stake, &rewards, &stake, hi).unwrap();
        prop_assert!(low.fee <= high.fee);
        prop_assert!(low.net_rewards >= high.net_rewards);
    }
}
