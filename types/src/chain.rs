//! Chain snapshots returned by the node collaborator.

use serde::{Deserialize, Serialize};

use crate::{Cycle, Mutez};

/// The current head block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHead {
    /// Base58 block hash (`B…`), also used as the operation branch.
    pub hash: String,
    pub level: u64,
    pub cycle: Cycle,
}

/// Protocol constants used for cycle arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// Number of cycles rewards stay frozen before becoming spendable.
    pub preserved_cycles: u32,
    pub blocks_per_cycle: u64,
    pub blocks_per_roll_snapshot: u64,
}

/// Descriptive data of one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    /// Hash of the roll snapshot block all cycle balances are read at.
    pub block_hash: String,
    pub random_seed: String,
    pub roll_snapshot: u32,
}

/// A delegate's frozen balance breakdown for one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenRewards {
    pub deposits: Mutez,
    pub fees: Mutez,
    pub rewards: Mutez,
}
