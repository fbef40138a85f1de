//! Stop signal for the payout service.
//!
//! The queue worker and the cycle watcher each hold a broadcast receiver and
//! stop at their next loop turn once it fires. A payout already being handled
//! is finished first.

use std::fmt;

use tokio::signal;
use tokio::sync::broadcast;

/// OS signal that ended a `serv` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Owns the sending half of the stop channel.
///
/// Background tasks must subscribe before the stop is sent. A receiver
/// created afterwards never sees it.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell every subscribed task to stop. Returns how many were listening.
    pub fn shutdown(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Block until the process is asked to stop, then notify the tasks.
    pub async fn wait_for_signal(&self) -> StopSignal {
        let received = next_stop_signal().await;
        let notified = self.shutdown();
        tracing::info!(signal = %received, tasks = notified, "stop requested");
        received
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

async fn next_stop_signal() -> StopSignal {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                // Interrupt still works.
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => StopSignal::Interrupt,
        _ = terminate => StopSignal::Terminate,
    }
}
