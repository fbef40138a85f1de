use async_trait::async_trait;
use bakepay_types::{BlockHead, Cycle, CycleInfo, FrozenRewards, Mutez, NetworkConstants};

use crate::RpcError;

/// Everything the payout pipeline reads from or writes to the chain.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn head(&self) -> Result<BlockHead, RpcError>;

    async fn constants(&self, block_hash: &str) -> Result<NetworkConstants, RpcError>;

    /// Cycle metadata, including the roll snapshot block balances are read at.
    async fn cycle(&self, cycle: Cycle) -> Result<CycleInfo, RpcError>;

    async fn frozen_rewards(&self, delegate: &str, cycle: Cycle) -> Result<FrozenRewards, RpcError>;

    async fn staking_balance(&self, delegate: &str, cycle: Cycle) -> Result<Mutez, RpcError>;

    async fn delegators(&self, delegate: &str, cycle: Cycle) -> Result<Vec<String>, RpcError>;

    async fn balance(&self, address: &str, block_hash: &str) -> Result<Mutez, RpcError>;

    async fn counter(&self, address: &str, block_hash: &str) -> Result<u64, RpcError>;

    /// Submit signed operation bytes. Returns the operation hash the node computed.
    async fn inject_operation(&self, signed: &[u8]) -> Result<String, RpcError>;
}
