//! Nullable node: programmable chain state instead of a live RPC endpoint.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bakepay_crypto::{base58, blake2b_256, prefix};
use bakepay_rpc::{NodeRpc, RpcError};
use bakepay_types::{BlockHead, Cycle, CycleInfo, FrozenRewards, Mutez, NetworkConstants};

/// Block hash every default head and snapshot carries.
pub const DEFAULT_BRANCH: &str = "BLfEWKVudXH15N8nwHZehyLNjRuNLoJavJDjSZ7nq8ggfzbZ18p";

/// One method of [`NodeRpc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Call {
    Head,
    Constants,
    Cycle,
    FrozenRewards,
    StakingBalance,
    Delegators,
    Balance,
    Counter,
    Inject,
}

struct NodeState {
    scripted_heads: VecDeque<BlockHead>,
    head: BlockHead,
    constants: NetworkConstants,
    cycle_info: CycleInfo,
    frozen_rewards: FrozenRewards,
    staking_balance: Mutez,
    delegators: Vec<String>,
    balances: HashMap<String, Mutez>,
    counter: u64,
    failures: HashMap<Call, RpcError>,
    failing_balances: HashSet<String>,
    returned_hash: Option<String>,
    delay: Option<Duration>,
    calls: Vec<Call>,
    injections: Vec<Vec<u8>>,
}

/// An in-memory [`NodeRpc`].
///
/// Every cycle reports the same frozen rewards, staking balance and delegators.
/// Balances are per address and default to zero.
pub struct NullNode {
    state: Mutex<NodeState>,
}

impl NullNode {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NodeState {
                scripted_heads: VecDeque::new(),
                head: BlockHead {
                    hash: DEFAULT_BRANCH.to_string(),
                    level: 1,
                    cycle: 0,
                },
                constants: NetworkConstants {
                    preserved_cycles: 5,
                    blocks_per_cycle: 4096,
                    blocks_per_roll_snapshot: 256,
                },
                cycle_info: CycleInfo {
                    block_hash: DEFAULT_BRANCH.to_string(),
                    random_seed: "some_seed".to_string(),
                    roll_snapshot: 10,
                },
                frozen_rewards: FrozenRewards::default(),
                staking_balance: Mutez::zero(),
                delegators: Vec::new(),
                balances: HashMap::new(),
                counter: 0,
                failures: HashMap::new(),
                failing_balances: HashSet::new(),
                returned_hash: None,
                delay: None,
                calls: Vec::new(),
                injections: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Head returned once the script is exhausted.
    pub fn set_head(&self, head: BlockHead) {
        self.lock().head = head;
    }

    /// Queue heads in the given cycles. Each `head()` call consumes one; the
    /// last one sticks.
    pub fn script_head_cycles(&self, cycles: impl IntoIterator<Item = Cycle>) {
        let mut state = self.lock();
        let branch = state.head.hash.clone();
        let blocks_per_cycle = state.constants.blocks_per_cycle;
        for cycle in cycles {
            state.scripted_heads.push_back(BlockHead {
                hash: branch.clone(),
                level: u64::from(cycle) * blocks_per_cycle + 1,
                cycle,
            });
        }
    }

    pub fn set_constants(&self, constants: NetworkConstants) {
        self.lock().constants = constants;
    }

    pub fn set_cycle_info(&self, info: CycleInfo) {
        self.lock().cycle_info = info;
    }

    pub fn set_frozen_rewards(&self, rewards: FrozenRewards) {
        self.lock().frozen_rewards = rewards;
    }

    pub fn set_staking_balance(&self, balance: impl Into<Mutez>) {
        self.lock().staking_balance = balance.into();
    }

    pub fn set_delegators<S: Into<String>>(&self, delegators: impl IntoIterator<Item = S>) {
        self.lock().delegators = delegators.into_iter().map(Into::into).collect();
    }

    pub fn set_balance(&self, address: &str, balance: impl Into<Mutez>) {
        self.lock().balances.insert(address.to_string(), balance.into());
    }

    pub fn set_counter(&self, counter: u64) {
        self.lock().counter = counter;
    }

    /// Make every later `call` fail with `error` until [`recover`](Self::recover).
    pub fn fail(&self, call: Call, error: RpcError) {
        self.lock().failures.insert(call, error);
    }

    pub fn recover(&self, call: Call) {
        self.lock().failures.remove(&call);
    }

    /// Make balance lookups of one address fail.
    pub fn fail_balance_of(&self, address: &str) {
        self.lock().failing_balances.insert(address.to_string());
    }

    /// Return `hash` from injections instead of the true operation hash.
    pub fn return_operation_hash(&self, hash: impl Into<String>) {
        self.lock().returned_hash = Some(hash.into());
    }

    /// Delay every call, to exercise caller timeouts.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, call: Call) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Signed bytes of every accepted injection, in order.
    pub fn injections(&self) -> Vec<Vec<u8>> {
        self.lock().injections.clone()
    }

    async fn enter(&self, call: Call) -> Result<(), RpcError> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(call);
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.lock().failures.get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for NullNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeRpc for NullNode {
    async fn head(&self) -> Result<BlockHead, RpcError> {
        self.enter(Call::Head).await?;
        let mut state = self.lock();
        if let Some(next) = state.scripted_heads.pop_front() {
            state.head = next;
        }
        Ok(state.head.clone())
    }

    async fn constants(&self, _block_hash: &str) -> Result<NetworkConstants, RpcError> {
        self.enter(Call::Constants).await?;
        Ok(self.lock().constants)
    }

    async fn cycle(&self, _cycle: Cycle) -> Result<CycleInfo, RpcError> {
        self.enter(Call::Cycle).await?;
        Ok(self.lock().cycle_info.clone())
    }

    async fn frozen_rewards(
        &self,
        _delegate: &str,
        _cycle: Cycle,
    ) -> Result<FrozenRewards, RpcError> {
        self.enter(Call::FrozenRewards).await?;
        Ok(self.lock().frozen_rewards.clone())
    }

    async fn staking_balance(&self, _delegate: &str, _cycle: Cycle) -> Result<Mutez, RpcError> {
        self.enter(Call::StakingBalance).await?;
        Ok(self.lock().staking_balance.clone())
    }

    async fn delegators(&self, _delegate: &str, _cycle: Cycle) -> Result<Vec<String>, RpcError> {
        self.enter(Call::Delegators).await?;
        Ok(self.lock().delegators.clone())
    }

    async fn balance(&self, address: &str, _block_hash: &str) -> Result<Mutez, RpcError> {
        self.enter(Call::Balance).await?;
        let state = self.lock();
        if state.failing_balances.contains(address) {
            return Err(RpcError::Status {
                path: format!("/context/contracts/{address}/balance"),
                status: 500,
                body: "null node balance failure".to_string(),
            });
        }
        Ok(state.balances.get(address).cloned().unwrap_or_default())
    }

    async fn counter(&self, _address: &str, _block_hash: &str) -> Result<u64, RpcError> {
        self.enter(Call::Counter).await?;
        Ok(self.lock().counter)
    }

    async fn inject_operation(&self, signed: &[u8]) -> Result<String, RpcError> {
        self.enter(Call::Inject).await?;
        let mut state = self.lock();
        state.injections.push(signed.to_vec());
        Ok(state
            .returned_hash
            .clone()
            .unwrap_or_else(|| base58::encode_check(&prefix::OPERATION_HASH, &blake2b_256(signed))))
    }
}
