//! FIFO payout queue and its single worker.
//!
//! Producers hold a cloneable [`PayoutQueue`]. The [`QueueWorker`] owns the
//! receiving end together with the [`PayoutProcessor`], handles one payout at a
//! time and emits exactly one [`PayoutReport`] per handled payout.

use bakepay_payout::PayoutReport;
use bakepay_types::Payout;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::NodeError;
use crate::processor::PayoutProcessor;

/// A payout waiting to be processed.
#[derive(Debug)]
pub struct QueueItem {
    pub payout: Payout,
    done: Option<oneshot::Sender<PayoutReport>>,
}

/// Producer handle. Cheap to clone.
#[derive(Clone)]
pub struct PayoutQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl PayoutQueue {
    /// Fire-and-forget. The report only shows up on the notification channel.
    pub fn enqueue(&self, payout: Payout) -> Result<(), NodeError> {
        self.push(QueueItem { payout, done: None })
    }

    /// Enqueue and get a receiver for this payout's report.
    ///
    /// The receiver errors if the worker stops before reaching the item.
    pub fn enqueue_and_wait(
        &self,
        payout: Payout,
    ) -> Result<oneshot::Receiver<PayoutReport>, NodeError> {
        let (done, rx) = oneshot::channel();
        self.push(QueueItem {
            payout,
            done: Some(done),
        })?;
        Ok(rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn push(&self, item: QueueItem) -> Result<(), NodeError> {
        let cycle = item.payout.cycle;
        self.tx.send(item).map_err(|_| NodeError::QueueClosed)?;
        tracing::info!(cycle, "payout enqueued");
        Ok(())
    }
}

pub struct QueueWorker {
    rx: mpsc::UnboundedReceiver<QueueItem>,
    processor: PayoutProcessor,
    reports: mpsc::UnboundedSender<PayoutReport>,
}

impl QueueWorker {
    /// Build a queue around `processor`.
    ///
    /// Returns the producer handle, the worker to spawn, and the notification
    /// channel that receives every report.
    pub fn channel(
        processor: PayoutProcessor,
    ) -> (PayoutQueue, Self, mpsc::UnboundedReceiver<PayoutReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (reports, reports_rx) = mpsc::unbounded_channel();
        let worker = Self {
            rx,
            processor,
            reports,
        };
        (PayoutQueue { tx }, worker, reports_rx)
    }

    /// Handle items until shutdown or until every producer is dropped.
    ///
    /// Shutdown is only observed between items, so the payout being handled
    /// always finishes.
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        loop {
            let item = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("payout worker shutting down");
                    break;
                }
                item = self.rx.recv() => match item {
                    Some(item) => item,
                    None => {
                        tracing::info!("payout queue closed, worker exiting");
                        break;
                    }
                },
            };
            self.handle(item).await;
        }
    }

    /// Process one item and deliver its report.
    pub async fn handle(&self, item: QueueItem) -> PayoutReport {
        let QueueItem { payout, done } = item;
        let outcome = self.processor.process(&payout).await;
        if let Err(e) = &outcome {
            tracing::error!(cycle = payout.cycle, error = %e, "payout failed");
        }
        let report = PayoutReport {
            cycle: payout.cycle,
            outcome,
        };

        // Nobody listening is fine for both channels.
        let _ = self.reports.send(report.clone());
        if let Some(done) = done {
            let _ = done.send(report.clone());
        }
        report
    }
}
