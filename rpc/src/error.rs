//! RPC error types.

use std::time::Duration;

use bakepay_types::Cycle;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("request to {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("node rejected the operation: {0}")]
    Rejected(String),

    #[error("cycle {requested} is in the future (head is in cycle {head}, {preserved} preserved cycles)")]
    FutureCycle {
        requested: Cycle,
        head: Cycle,
        preserved: u32,
    },
}

impl RpcError {
    pub fn decode(path: &str, message: impl ToString) -> Self {
        Self::Decode {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}
