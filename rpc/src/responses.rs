//! Response bodies of the node's REST interface.
//!
//! Numeric amounts arrive as decimal strings. Counters do too. Decoding happens
//! from raw text so each shape can be tested without a node.

use bakepay_types::{BlockHead, Cycle, FrozenRewards, Mutez, NetworkConstants};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::RpcError;

#[derive(Debug, Deserialize)]
struct HeadResponse {
    hash: String,
    header: HeaderResponse,
    #[serde(default)]
    metadata: Option<MetadataResponse>,
}

#[derive(Debug, Deserialize)]
struct HeaderResponse {
    level: u64,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    level: Option<LevelResponse>,
    #[serde(default)]
    level_info: Option<LevelResponse>,
}

#[derive(Debug, Deserialize)]
struct LevelResponse {
    cycle: Cycle,
}

/// Raw cycle record. The snapshot block hash is resolved separately.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCycle {
    pub random_seed: String,
    pub roll_snapshot: u32,
}

pub fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, RpcError> {
    serde_json::from_str(body).map_err(|e| RpcError::decode(path, e))
}

pub fn head(path: &str, body: &str) -> Result<BlockHead, RpcError> {
    let raw: HeadResponse = decode(path, body)?;
    let cycle = raw
        .metadata
        .and_then(|m| m.level.or(m.level_info))
        .map(|l| l.cycle)
        .ok_or_else(|| RpcError::decode(path, "head metadata carries no cycle"))?;
    Ok(BlockHead {
        hash: raw.hash,
        level: raw.header.level,
        cycle,
    })
}

pub fn constants(path: &str, body: &str) -> Result<NetworkConstants, RpcError> {
    decode(path, body)
}

pub fn raw_cycle(path: &str, body: &str) -> Result<RawCycle, RpcError> {
    decode(path, body)
}

pub fn frozen_rewards(path: &str, body: &str) -> Result<FrozenRewards, RpcError> {
    decode(path, body)
}

pub fn mutez(path: &str, body: &str) -> Result<Mutez, RpcError> {
    decode(path, body)
}

pub fn counter(path: &str, body: &str) -> Result<u64, RpcError> {
    let text: String = decode(path, body)?;
    text.parse().map_err(|e| RpcError::decode(path, format!("counter {text:?}: {e}")))
}

pub fn addresses(path: &str, body: &str) -> Result<Vec<String>, RpcError> {
    decode(path, body)
}

/// A bare JSON string, as returned for block hashes and injected operation hashes.
pub fn string(path: &str, body: &str) -> Result<String, RpcError> {
    decode(path, body)
}
