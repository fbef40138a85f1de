//! Nullable infrastructure for deterministic testing.
//!
//! The node collaborator is abstracted behind [`bakepay_rpc::NodeRpc`]. This crate
//! provides an in-memory implementation that:
//! - Returns deterministic, programmable chain state
//! - Can be made to fail call by call
//! - Records every call and every injected operation
//! - Never touches the network
//!
//! Usage: hand an `Arc<NullNode>` wherever an `Arc<dyn NodeRpc>` is expected.

pub mod node;

pub use node::{Call, NullNode};
