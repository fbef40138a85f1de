//! Fixed per-transaction parameters embedded in every forged transfer.

use serde::{Deserialize, Serialize};

/// Network fee, gas limit and storage limit applied to each transfer of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationParams {
    /// Fee in mutez paid to the block producer for each transfer.
    pub fee: u64,
    pub gas_limit: u64,
    pub storage_limit: u64,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            fee: 1_420,
            gas_limit: 10_600,
            storage_limit: 0,
        }
    }
}
