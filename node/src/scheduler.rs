//! Cycle watcher: polls the head and enqueues one payout per new cycle.

use std::sync::Arc;
use std::time::Duration;

use bakepay_payout::{bounded, PayoutAssembler, Subject};
use bakepay_rpc::NodeRpc;
use bakepay_types::Cycle;
use tokio::sync::broadcast;

use crate::error::NodeError;
use crate::queue::PayoutQueue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatcherState {
    /// No head observed yet.
    Idle,
    Watching { last_seen: Cycle },
    Building { target: Cycle },
    Enqueued { target: Cycle },
}

/// What a single poll did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// First head seen. Only recorded.
    FirstHead(Cycle),
    /// Head cycle not greater than the last one.
    Unchanged(Cycle),
    /// New cycle, but no unfrozen cycle exists yet to pay.
    Skipped(Cycle),
    Enqueued { cycle: Cycle, target: Cycle },
}

#[derive(Clone, Copy, Debug)]
pub struct WatcherOptions {
    pub poll_interval: Duration,
    pub call_timeout: Duration,
    /// Pay `cycle - preserved_cycles` instead of the cycle that just ended.
    pub wait_for_unfreeze: bool,
}

pub struct CycleWatcher {
    rpc: Arc<dyn NodeRpc>,
    assembler: PayoutAssembler,
    queue: PayoutQueue,
    options: WatcherOptions,
    preserved_cycles: Option<u32>,
    last_seen: Option<Cycle>,
    state: WatcherState,
    skipped: Vec<Cycle>,
}

impl CycleWatcher {
    pub fn new(
        rpc: Arc<dyn NodeRpc>,
        assembler: PayoutAssembler,
        queue: PayoutQueue,
        options: WatcherOptions,
    ) -> Self {
        Self {
            rpc,
            assembler,
            queue,
            options,
            preserved_cycles: None,
            last_seen: None,
            state: WatcherState::Idle,
            skipped: Vec::new(),
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn last_seen(&self) -> Option<Cycle> {
        self.last_seen
    }

    /// Cycles that were observed but had nothing unfrozen to pay.
    pub fn skipped(&self) -> &[Cycle] {
        &self.skipped
    }

    /// Read `preserved_cycles` once. Later calls are no-ops.
    pub async fn start(&mut self) -> Result<u32, NodeError> {
        if let Some(preserved) = self.preserved_cycles {
            return Ok(preserved);
        }
        let constants = bounded(
            self.options.call_timeout,
            "constants",
            Subject::Constants,
            self.rpc.constants("head"),
        )
        .await?;
        tracing::info!(preserved_cycles = constants.preserved_cycles, "cycle watcher started");
        self.preserved_cycles = Some(constants.preserved_cycles);
        Ok(constants.preserved_cycles)
    }

    /// Look at the head once and enqueue a payout if the cycle advanced.
    ///
    /// The payout is for the last cycle seen, whose frozen balance is final
    /// once the head has moved past it. With `wait_for_unfreeze` it is for
    /// `cycle - preserved_cycles` instead.
    ///
    /// On failure `last_seen` stays put, so the next poll retries the same
    /// transition.
    pub async fn poll(&mut self) -> Result<PollOutcome, NodeError> {
        let preserved = self.start().await?;
        let head = bounded(
            self.options.call_timeout,
            "head",
            Subject::Head,
            self.rpc.head(),
        )
        .await?;
        tracing::debug!(cycle = head.cycle, level = head.level, "polled head");

        let last_seen = match self.last_seen {
            None => {
                self.record(head.cycle);
                return Ok(PollOutcome::FirstHead(head.cycle));
            }
            Some(last) if head.cycle <= last => return Ok(PollOutcome::Unchanged(head.cycle)),
            Some(last) => last,
        };

        tracing::info!(cycle = head.cycle, previous = last_seen, "new cycle");
        let target = if self.options.wait_for_unfreeze {
            match head.cycle.checked_sub(preserved) {
                Some(target) => target,
                None => {
                    tracing::info!(cycle = head.cycle, preserved, "no unfrozen cycle to pay yet");
                    self.skipped.push(head.cycle);
                    self.record(head.cycle);
                    return Ok(PollOutcome::Skipped(head.cycle));
                }
            }
        } else {
            last_seen
        };

        self.state = WatcherState::Building { target };
        let payout = match self.assembler.assemble(target).await {
            Ok(payout) => payout,
            Err(e) => {
                self.state = WatcherState::Watching { last_seen };
                return Err(e.into());
            }
        };
        if let Err(e) = self.queue.enqueue(payout) {
            self.state = WatcherState::Watching { last_seen };
            return Err(e);
        }

        self.last_seen = Some(head.cycle);
        self.state = WatcherState::Enqueued { target };
        Ok(PollOutcome::Enqueued {
            cycle: head.cycle,
            target,
        })
    }

    /// Poll on an interval until shutdown. Errors are logged and never end
    /// the loop.
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.options.poll_interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("cycle watcher shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.poll().await {
                        tracing::error!(
                            error = %e,
                            last_seen = ?self.last_seen,
                            "cycle poll failed"
                        );
                    }
                }
            }
        }
    }

    fn record(&mut self, cycle: Cycle) {
        self.last_seen = Some(cycle);
        self.state = WatcherState::Watching { last_seen: cycle };
    }
}
