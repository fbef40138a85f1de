//! Cycle to block-level arithmetic.

use bakepay_types::{Cycle, NetworkConstants};

use crate::RpcError;

/// Level of the roll snapshot block for `cycle`.
///
/// Snapshots are taken `preserved_cycles + 2` cycles ahead. Early cycles clamp
/// to level 1.
pub fn snapshot_level(cycle: Cycle, roll_snapshot: u32, constants: &NetworkConstants) -> u64 {
    let start = (i64::from(cycle) - i64::from(constants.preserved_cycles) - 2)
        .saturating_mul(constants.blocks_per_cycle as i64);
    let offset = (i64::from(roll_snapshot) + 1)
        .saturating_mul(constants.blocks_per_roll_snapshot as i64);
    start.saturating_add(offset).max(1) as u64
}

/// First block of `cycle`.
pub fn first_level(cycle: Cycle, constants: &NetworkConstants) -> u64 {
    u64::from(cycle) * constants.blocks_per_cycle + 1
}

/// Block at which the frozen balance of `cycle` is final.
pub fn frozen_balance_level(cycle: Cycle, constants: &NetworkConstants) -> u64 {
    first_level(cycle + 1, constants)
}

/// Cycle data is only known `preserved_cycles − 1` cycles ahead of the head.
pub fn check_not_future(
    cycle: Cycle,
    head: Cycle,
    constants: &NetworkConstants,
) -> Result<(), RpcError> {
    let horizon = i64::from(head) + i64::from(constants.preserved_cycles) - 1;
    if i64::from(cycle) > horizon {
        return Err(RpcError::FutureCycle {
            requested: cycle,
            head,
            preserved: constants.preserved_cycles,
        });
    }
    Ok(())
}
