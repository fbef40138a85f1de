//! bakepay service.
//!
//! Wires the payout pipeline into a long-running process:
//! - a [`CycleWatcher`] polls the head and assembles one payout per new cycle
//! - a [`PayoutQueue`] feeds the single [`QueueWorker`]
//! - the [`PayoutProcessor`] filters, forges, signs and injects each payout
//! - every processed payout yields one [`PayoutReport`](bakepay_payout::PayoutReport)

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod processor;
pub mod queue;
pub mod scheduler;
pub mod shutdown;

pub use config::{BakepayConfig, WALLET_SECRET_ENV};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::BakepayNode;
pub use processor::PayoutProcessor;
pub use queue::{PayoutQueue, QueueItem, QueueWorker};
pub use scheduler::{CycleWatcher, PollOutcome, WatcherOptions, WatcherState};
pub use shutdown::{ShutdownController, StopSignal};
