//! Payout error taxonomy.

use std::fmt;

use bakepay_crypto::{CryptoError, Curve};
use bakepay_forge::ForgeError;
use bakepay_rpc::RpcError;
use bakepay_types::{Cycle, InvariantViolation};
use thiserror::Error;

/// What an upstream lookup was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Head,
    Constants,
    Cycle(Cycle),
    Delegate(String),
    Delegator(String),
    Wallet(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head block"),
            Self::Constants => f.write_str("network constants"),
            Self::Cycle(cycle) => write!(f, "cycle {cycle}"),
            Self::Delegate(address) => write!(f, "delegate {address}"),
            Self::Delegator(address) => write!(f, "delegator {address}"),
            Self::Wallet(address) => write!(f, "wallet {address}"),
        }
    }
}

/// A failed read from the node, annotated with what was being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to get {operation} of {subject}: {source}")]
pub struct LookupFailure {
    pub operation: &'static str,
    pub subject: Subject,
    pub source: RpcError,
}

impl LookupFailure {
    pub fn new(operation: &'static str, subject: Subject, source: RpcError) -> Self {
        Self {
            operation,
            subject,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayoutError {
    #[error(transparent)]
    Lookup(#[from] LookupFailure),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("signature self-check failed for {curve} wallet key")]
    SignatureSelfCheckFailed { curve: Curve },

    #[error("submission failed: {0}")]
    Submission(RpcError),
}

impl PayoutError {
    /// The node-level source of a lookup or submission failure.
    pub fn rpc_source(&self) -> Option<&RpcError> {
        match self {
            Self::Lookup(failure) => Some(&failure.source),
            Self::Submission(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ForgeError> for PayoutError {
    fn from(e: ForgeError) -> Self {
        match e {
            ForgeError::Encoding(message) => Self::Encoding(message),
            ForgeError::CounterOverflow { counter } => {
                Self::Invariant(InvariantViolation::CounterOverflow { counter })
            }
        }
    }
}

impl From<CryptoError> for PayoutError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::SignatureSelfCheckFailed { curve } => {
                Self::SignatureSelfCheckFailed { curve }
            }
            other => Self::Encoding(other.to_string()),
        }
    }
}
