//! Per-delegator reward arithmetic.
//!
//! ```text
//! gross = floor(frozen_rewards × stake / staking_balance)
//! fee   = floor(gross × fee_rate)
//! net   = gross − fee
//! ```
//!
//! All divisions truncate toward zero. Rounding dust stays with the baker.

use bakepay_types::{DelegationEarning, FeeRate, InvariantViolation, Mutez};

/// Compute one delegator's earning for a cycle.
pub fn compute(
    delegator: &str,
    stake: &Mutez,
    frozen_rewards: &Mutez,
    staking_balance: &Mutez,
    fee_rate: FeeRate,
) -> Result<DelegationEarning, InvariantViolation> {
    if staking_balance.is_zero() {
        return Err(InvariantViolation::DivisionByZero {
            delegator: delegator.to_string(),
        });
    }
    if stake > staking_balance {
        return Err(InvariantViolation::StakeExceedsStakingBalance {
            delegator: delegator.to_string(),
            stake: stake.clone(),
            staking_balance: staking_balance.clone(),
        });
    }

    let gross = Mutez::new(
        frozen_rewards.as_biguint() * stake.as_biguint() / staking_balance.as_biguint(),
    );
    let fee = fee_rate.apply(&gross);
    let net = gross
        .checked_sub(&fee)
        .ok_or(InvariantViolation::FeeRateOutOfRange { rate: fee_rate.as_f64() })?;

    Ok(DelegationEarning {
        delegator: delegator.to_string(),
        fee,
        gross_rewards: gross,
        net_rewards: net,
        share: stake.to_f64_lossy() / staking_balance.to_f64_lossy(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(r: f64) -> FeeRate {
        FeeRate::from_f64(r).unwrap()
    }

    #[test]
    fn ten_percent_delegator_at_five_percent_fee() {
        let earning = compute(
            "tz1delegator",
            &Mutez::from(10_000_000_000u64),
            &Mutez::from(800_000_000u64),
            &Mutez::from(100_000_000_000u64),
            rate(0.05),
        )
        .unwrap();
        assert_eq!(earning.fee, Mutez::from(4_000_000u64));
        assert_eq!(earning.gross_rewards, Mutez::from(80_000_000u64));
        assert_eq!(earning.net_rewards, Mutez::from(76_000_000u64));
        assert_eq!(earning.share, 0.1);
    }

    #[test]
    fn zero_staking_balance_is_division_by_zero() {
        let err = compute("tz1x", &Mutez::zero(), &Mutez::from(1u64), &Mutez::zero(), rate(0.1))
            .unwrap_err();
        assert_eq!(err, InvariantViolation::DivisionByZero { delegator: "tz1x".into() });
    }

    #[test]
    fn stake_above_staking_balance_rejected() {
        let err = compute(
            "tz1x",
            &Mutez::from(11u64),
            &Mutez::from(1u64),
            &Mutez::from(10u64),
            rate(0.1),
        )
        .unwrap_err();
        assert!(matches!(err, InvariantViolation::StakeExceedsStakingBalance { .. }));
    }

    #[test]
    fn truncation_never_rounds_up() {
        // 10 × 1 / 3 = 3.33… → 3, fee 3 × 0.5 = 1.5 → 1
        let e = compute(
            "tz1x",
            &Mutez::from(1u64),
            &Mutez::from(10u64),
            &Mutez::from(3u64),
            rate(0.5),
        )
        .unwrap();
        assert_eq!(e.gross_rewards, Mutez::from(3u64));
        assert_eq!(e.fee, Mutez::from(1u64));
        assert_eq!(e.net_rewards, Mutez::from(2u64));
    }

    #[test]
    fn full_fee_leaves_nothing() {
        let e = compute(
            "tz1x",
            &Mutez::from(5u64),
            &Mutez::from(100u64),
            &Mutez::from(10u64),
            rate(1.0),
        )
        .unwrap();
        assert_eq!(e.gross_rewards, Mutez::from(50u64));
        assert!(e.net_rewards.is_zero());
    }

    #[test]
    fn amounts_beyond_u64() {
        let huge = Mutez::new(num_bigint::BigUint::from(u64::MAX) * 4u32);
        let e = compute("tz1x", &huge, &huge, &huge, FeeRate::ZERO).unwrap();
        assert_eq!(e.gross_rewards, huge);
        assert_eq!(e.net_rewards, huge);
    }

    #[test]
    fn same_inputs_same_output() {
        let args = (Mutez::from(123u64), Mutez::from(45_678u64), Mutez::from(9_999u64));
        let a = compute("tz1x", &args.0, &args.1, &args.2, rate(0.07)).unwrap();
        let b = compute("tz1x", &args.0, &args.1, &args.2, rate(0.07)).unwrap();
        assert_eq!(a, b);
    }
}
