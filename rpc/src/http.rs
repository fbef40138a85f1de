//! HTTP implementation of [`NodeRpc`].

use std::time::Duration;

use async_trait::async_trait;
use bakepay_types::{BlockHead, Cycle, CycleInfo, FrozenRewards, Mutez, NetworkConstants};
use tokio::sync::OnceCell;

use crate::responses;
use crate::snapshot::{check_not_future, first_level, frozen_balance_level, snapshot_level};
use crate::{NodeRpc, RpcError};

const CHAIN: &str = "/chains/main/blocks";

/// REST client for a node.
///
/// Network constants are fetched once per client and cached. Every request is
/// bounded by the timeout given at construction.
pub struct HttpNodeClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    constants_cache: OnceCell<NetworkConstants>,
}

impl HttpNodeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RpcError::Request {
                path: base_url.clone(),
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url,
            timeout,
            constants_cache: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_error(&self, path: &str, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout(self.timeout)
        } else {
            RpcError::Request {
                path: path.to_string(),
                message: e.to_string(),
            }
        }
    }

    async fn get_text(&self, path: &str) -> Result<String, RpcError> {
        tracing::trace!(path, "GET");
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| self.request_error(path, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(path, e))?;
        if !status.is_success() {
            return Err(RpcError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn network_constants(&self) -> Result<NetworkConstants, RpcError> {
        self.constants_cache
            .get_or_try_init(|| self.constants("head"))
            .await
            .copied()
    }

    async fn block_hash_at(&self, level: u64) -> Result<String, RpcError> {
        let path = format!("{CHAIN}/{level}/hash");
        responses::string(&path, &self.get_text(&path).await?)
    }

    /// Hash of the snapshot block all balances of `cycle` are read at.
    async fn snapshot_hash(&self, cycle: Cycle) -> Result<String, RpcError> {
        Ok(self.cycle(cycle).await?.block_hash)
    }
}

#[async_trait]
impl NodeRpc for HttpNodeClient {
    async fn head(&self) -> Result<BlockHead, RpcError> {
        let path = format!("{CHAIN}/head");
        responses::head(&path, &self.get_text(&path).await?)
    }

    async fn constants(&self, block_hash: &str) -> Result<NetworkConstants, RpcError> {
        let path = format!("{CHAIN}/{block_hash}/context/constants");
        responses::constants(&path, &self.get_text(&path).await?)
    }

    async fn cycle(&self, cycle: Cycle) -> Result<CycleInfo, RpcError> {
        let constants = self.network_constants().await?;
        let head = self.head().await?;
        check_not_future(cycle, head.cycle, &constants)?;

        let at = if cycle < head.cycle {
            self.block_hash_at(first_level(cycle, &constants)).await?
        } else {
            head.hash
        };
        let path = format!("{CHAIN}/{at}/context/raw/json/cycle/{cycle}");
        let raw = responses::raw_cycle(&path, &self.get_text(&path).await?)?;

        let level = snapshot_level(cycle, raw.roll_snapshot, &constants);
        let block_hash = self.block_hash_at(level).await?;
        Ok(CycleInfo {
            block_hash,
            random_seed: raw.random_seed,
            roll_snapshot: raw.roll_snapshot,
        })
    }

    async fn frozen_rewards(
        &self,
        delegate: &str,
        cycle: Cycle,
    ) -> Result<FrozenRewards, RpcError> {
        let constants = self.network_constants().await?;
        let at = self.block_hash_at(frozen_balance_level(cycle, &constants)).await?;
        let path = format!(
            "{CHAIN}/{at}/context/raw/json/contracts/index/{delegate}/frozen_balance/{cycle}/"
        );
        responses::frozen_rewards(&path, &self.get_text(&path).await?)
    }

    async fn staking_balance(&self, delegate: &str, cycle: Cycle) -> Result<Mutez, RpcError> {
        let at = self.snapshot_hash(cycle).await?;
        let path = format!("{CHAIN}/{at}/context/delegates/{delegate}/staking_balance");
        responses::mutez(&path, &self.get_text(&path).await?)
    }

    async fn delegators(&self, delegate: &str, cycle: Cycle) -> Result<Vec<String>, RpcError> {
        let at = self.snapshot_hash(cycle).await?;
        let path = format!("{CHAIN}/{at}/context/delegates/{delegate}/delegated_contracts");
        responses::addresses(&path, &self.get_text(&path).await?)
    }

    async fn balance(&self, address: &str, block_hash: &str) -> Result<Mutez, RpcError> {
        let path = format!("{CHAIN}/{block_hash}/context/contracts/{address}/balance");
        responses::mutez(&path, &self.get_text(&path).await?)
    }

    async fn counter(&self, address: &str, block_hash: &str) -> Result<u64, RpcError> {
        let path = format!("{CHAIN}/{block_hash}/context/contracts/{address}/counter");
        responses::counter(&path, &self.get_text(&path).await?)
    }

    async fn inject_operation(&self, signed: &[u8]) -> Result<String, RpcError> {
        let path = "/injection/operation?chain=main";
        let payload = hex::encode(signed);
        tracing::debug!(bytes = signed.len(), "injecting operation");

        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.request_error(path, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(path, e))?;
        if !status.is_success() {
            return Err(RpcError::Rejected(body));
        }
        responses::string(path, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let client = HttpNodeClient::new("http://127.0.0.1:8732/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8732");
    }

    #[tokio::test]
    async fn unreachable_node_is_request_error() {
        // Port 9 (discard) is closed on test hosts.
        let client = HttpNodeClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.head().await.unwrap_err();
        assert!(matches!(err, RpcError::Request { .. } | RpcError::Timeout(_)), "{err}");
    }
}
