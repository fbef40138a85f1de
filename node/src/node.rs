//! Service wiring: node client, wallet, queue worker and cycle watcher.

use std::sync::Arc;
use std::time::Duration;

use bakepay_crypto::Wallet;
use bakepay_payout::{AssemblerConfig, PayoutAssembler, PayoutReport};
use bakepay_rpc::{HttpNodeClient, NodeRpc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::BakepayConfig;
use crate::error::NodeError;
use crate::processor::PayoutProcessor;
use crate::queue::{PayoutQueue, QueueWorker};
use crate::scheduler::{CycleWatcher, WatcherOptions};
use crate::shutdown::ShutdownController;

/// Maximum time to wait for background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BakepayNode {
    config: BakepayConfig,
    rpc: Arc<dyn NodeRpc>,
    assembler_config: AssemblerConfig,
    shutdown: ShutdownController,
    queue: PayoutQueue,
    worker: Option<QueueWorker>,
    watcher: Option<CycleWatcher>,
    reports: Option<mpsc::UnboundedReceiver<PayoutReport>>,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Vec<JoinHandle<()>>,
}

impl BakepayNode {
    /// Build a service that talks to `config.host_node` over HTTP.
    pub fn connect(config: BakepayConfig) -> Result<Self, NodeError> {
        let rpc = HttpNodeClient::new(config.host_node.clone(), config.call_timeout())?;
        Self::with_rpc(config, Arc::new(rpc))
    }

    /// Build a service on top of any node implementation.
    pub fn with_rpc(config: BakepayConfig, rpc: Arc<dyn NodeRpc>) -> Result<Self, NodeError> {
        config.validate()?;
        let wallet = Wallet::from_secret_key(&config.wallet_secret()?)?;
        tracing::info!(
            delegate = %config.delegate,
            wallet = %wallet.address(),
            host_node = %config.host_node,
            "payout service configured"
        );
        if wallet.address().to_base58() != config.delegate {
            tracing::warn!(
                wallet = %wallet.address(),
                delegate = %config.delegate,
                "wallet pays from an address other than the delegate"
            );
        }

        let assembler_config = config.assembler_config()?;
        let processor = PayoutProcessor::new(
            rpc.clone(),
            wallet,
            config.payout_filter(),
            config.operation_params(),
            config.call_timeout(),
        );
        let (queue, worker, reports) = QueueWorker::channel(processor);
        let watcher = CycleWatcher::new(
            rpc.clone(),
            PayoutAssembler::new(rpc.clone(), assembler_config.clone()),
            queue.clone(),
            WatcherOptions {
                poll_interval: config.poll_interval(),
                call_timeout: config.call_timeout(),
                wait_for_unfreeze: config.payout.wait_for_unfreeze,
            },
        );

        Ok(Self {
            config,
            rpc,
            assembler_config,
            shutdown: ShutdownController::new(),
            queue,
            worker: Some(worker),
            watcher: Some(watcher),
            reports: Some(reports),
            task_handles: Vec::new(),
        })
    }

    pub fn config(&self) -> &BakepayConfig {
        &self.config
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// A producer handle onto the payout queue.
    pub fn queue(&self) -> PayoutQueue {
        self.queue.clone()
    }

    /// A fresh assembler, independent of the watcher's.
    pub fn assembler(&self) -> PayoutAssembler {
        PayoutAssembler::new(self.rpc.clone(), self.assembler_config.clone())
    }

    /// The report notification channel. Can be taken once.
    pub fn take_reports(&mut self) -> Option<mpsc::UnboundedReceiver<PayoutReport>> {
        self.reports.take()
    }

    /// Spawn the queue worker. No-op if already running.
    pub fn spawn_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let shutdown_rx = self.shutdown.subscribe();
            self.task_handles.push(tokio::spawn(worker.run(shutdown_rx)));
        }
    }

    /// Spawn the cycle watcher. No-op if already running.
    pub fn spawn_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            let shutdown_rx = self.shutdown.subscribe();
            self.task_handles.push(tokio::spawn(watcher.run(shutdown_rx)));
        }
    }

    /// Spawn the worker and the watcher.
    pub fn start(&mut self) {
        self.spawn_worker();
        self.spawn_watcher();
        tracing::info!(
            poll_interval = ?self.config.poll_interval(),
            wait_for_unfreeze = self.config.payout.wait_for_unfreeze,
            "payout service started"
        );
    }

    /// Signal shutdown and wait for the background tasks.
    pub async fn shutdown(mut self) -> Result<(), NodeError> {
        tracing::info!("stopping payout service");
        self.shutdown.shutdown();
        drop(self.watcher.take());

        let handles = std::mem::take(&mut self.task_handles);
        let wait_all = async move {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            tracing::warn!(
                "shutdown timeout ({:?}), some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
            return Err(NodeError::ShutdownTimeout);
        }
        tracing::info!("payout service stopped");
        Ok(())
    }
}
