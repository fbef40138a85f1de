//! Builds the payout of one cycle from node data.
//!
//! Four cycle-level lookups (frozen rewards, staking balance, cycle snapshot,
//! delegators) must all succeed. Delegator balances are then fetched
//! concurrently, one task per delegator, and run through the calculator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bakepay_rpc::{NodeRpc, RpcError};
use bakepay_types::{
    Cycle, DelegationEarning, DelegationEarnings, FeeRate, InvariantViolation, Mutez, Payout,
};

use crate::calculator;
use crate::config::{AssemblerConfig, EarningsOrder, FailurePolicy};
use crate::error::{LookupFailure, PayoutError, Subject};

pub struct PayoutAssembler {
    rpc: Arc<dyn NodeRpc>,
    config: AssemblerConfig,
}

impl PayoutAssembler {
    pub fn new(rpc: Arc<dyn NodeRpc>, config: AssemblerConfig) -> Self {
        Self { rpc, config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Assemble the unfiltered payout for `cycle`.
    pub async fn assemble(&self, cycle: Cycle) -> Result<Payout, PayoutError> {
        let delegate = self.config.delegate.as_str();
        let timeout = self.config.call_timeout;
        let subject = || Subject::Delegate(delegate.to_string());

        let frozen = bounded(
            timeout,
            "frozen balance",
            subject(),
            self.rpc.frozen_rewards(delegate, cycle),
        )
        .await?;
        let staking_balance = bounded(
            timeout,
            "staking balance",
            subject(),
            self.rpc.staking_balance(delegate, cycle),
        )
        .await?;
        let snapshot =
            bounded(timeout, "snapshot", Subject::Cycle(cycle), self.rpc.cycle(cycle)).await?;
        let delegators = bounded(
            timeout,
            "delegated contracts",
            subject(),
            self.rpc.delegators(delegate, cycle),
        )
        .await?;

        tracing::debug!(
            cycle,
            delegators = delegators.len(),
            rewards = %frozen.rewards,
            staking_balance = %staking_balance,
            "assembling payout"
        );

        let outcomes = self
            .process_delegations(
                &delegators,
                &snapshot.block_hash,
                &frozen.rewards,
                &staking_balance,
            )
            .await;

        let mut earnings = Vec::with_capacity(outcomes.len());
        for (delegator, outcome) in delegators.iter().zip(outcomes) {
            // Only lookups are skippable. A broken reward invariant fails the cycle.
            match (outcome, self.config.failure_policy) {
                (Ok(earning), _) => earnings.push(earning),
                (Err(e @ PayoutError::Lookup(_)), FailurePolicy::SkipFailed) => {
                    tracing::warn!(cycle, delegator = %delegator, error = %e, "skipping delegator");
                }
                (Err(e), _) => return Err(e),
            }
        }

        let mut earnings = DelegationEarnings::new(earnings);
        if self.config.earnings_order == EarningsOrder::Sorted {
            earnings.sort_by_address();
        }

        let allocated = earnings.total_gross();
        if allocated > frozen.rewards {
            return Err(InvariantViolation::RewardsOverallocated {
                cycle,
                allocated,
                available: frozen.rewards,
            }
            .into());
        }

        Ok(Payout {
            delegation_earnings: earnings,
            cycle,
            frozen_balance: frozen.rewards,
            staking_balance,
            delegate: self.config.delegate.clone(),
        })
    }

    /// Compute every delegator's earning concurrently.
    ///
    /// Returns one outcome per delegator, in input order.
    pub async fn process_delegations(
        &self,
        delegators: &[String],
        snapshot_block: &str,
        rewards: &Mutez,
        staking_balance: &Mutez,
    ) -> Vec<Result<DelegationEarning, PayoutError>> {
        let mut handles = Vec::with_capacity(delegators.len());

        for delegator in delegators {
            let rpc = Arc::clone(&self.rpc);
            let delegator = delegator.clone();
            let block = snapshot_block.to_string();
            let rewards = rewards.clone();
            let staking_balance = staking_balance.clone();
            let fee_rate = self.config.fee_rate;
            let timeout = self.config.call_timeout;

            handles.push(tokio::spawn(async move {
                process_delegation(
                    rpc,
                    timeout,
                    &delegator,
                    &block,
                    &rewards,
                    &staking_balance,
                    fee_rate,
                )
                .await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, delegator) in handles.into_iter().zip(delegators) {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => results.push(Err(LookupFailure::new(
                    "balance",
                    Subject::Delegator(delegator.clone()),
                    RpcError::Request {
                        path: "balance".to_string(),
                        message: format!("task join error: {e}"),
                    },
                )
                .into())),
            }
        }
        results
    }
}

/// Fetch one delegator's stake and compute its earning.
async fn process_delegation(
    rpc: Arc<dyn NodeRpc>,
    timeout: Duration,
    delegator: &str,
    snapshot_block: &str,
    rewards: &Mutez,
    staking_balance: &Mutez,
    fee_rate: FeeRate,
) -> Result<DelegationEarning, PayoutError> {
    let stake = bounded(
        timeout,
        "balance",
        Subject::Delegator(delegator.to_string()),
        rpc.balance(delegator, snapshot_block),
    )
    .await?;
    Ok(calculator::compute(delegator, &stake, rewards, staking_balance, fee_rate)?)
}

/// Run a node call under `timeout`, annotating failures with what was asked.
pub async fn bounded<T>(
    timeout: Duration,
    operation: &'static str,
    subject: Subject,
    call: impl Future<Output = Result<T, RpcError>>,
) -> Result<T, PayoutError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(LookupFailure::new(operation, subject, source).into()),
        Err(_) => Err(LookupFailure::new(operation, subject, RpcError::Timeout(timeout)).into()),
    }
}
