//! Node RPC for bakepay.
//!
//! [`NodeRpc`] is the collaborator interface the payout pipeline talks to. It is
//! object-safe and used as `Arc<dyn NodeRpc>`. [`HttpNodeClient`] implements it
//! against a node's REST interface. Tests use the in-memory node from
//! `bakepay-nullables`.

pub mod client;
pub mod error;
pub mod http;
pub mod responses;
pub mod snapshot;

pub use client::NodeRpc;
pub use error::RpcError;
pub use http::HttpNodeClient;
