use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::domain::chain::ChainSource;
use crate::domain::models::BlockData;
use crate::infrastructure::rpc::error::RpcClientError;
use crate::infrastructure::rpc::types::{BlockView, StatusView};

/// Client for the nearcore JSON-RPC endpoint.
///
/// The client performs no retries; a failed call surfaces as an error and
/// the sync coordinator picks the height up again on a later pass.
#[derive(Debug, Clone)]
pub struct NearRpcClient {
    client: Client,
    rpc_url: String,
}

impl NearRpcClient {
    /// Create a new RPC client from application configuration
    pub fn new(config: &AppConfig) -> Self {
        NearRpcClient {
            client: Client::new(),
            rpc_url: config.rpc.url.clone(),
        }
    }

    /// Returns the current chain tip height
    pub async fn status(&self) -> Result<StatusView, RpcClientError> {
        self.call("status", json!([])).await
    }

    /// Returns the block at the given height with its embedded transactions
    pub async fn block(&self, height: u64) -> Result<BlockView, RpcClientError> {
        self.call("block", json!([height]))
            .await
            .map_err(|e| match e {
                RpcClientError::Rpc(msg) if is_unknown_block(&msg) => {
                    RpcClientError::UnknownBlock(height)
                }
                other => other,
            })
    }

    /// Perform a single JSON-RPC 2.0 call and decode its `result` field
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcClientError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "dontcare",
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(RpcClientError::Transport(format!(
                "RPC endpoint returned status {}",
                response.status()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| RpcClientError::Decode(e.to_string()))?;

        if let Some(error) = envelope.get("error") {
            return Err(RpcClientError::Rpc(error.to_string()));
        }

        match envelope.get("result") {
            Some(result) => serde_json::from_value(result.clone())
                .map_err(|e| RpcClientError::Decode(format!("{} response: {}", method, e))),
            None => Err(RpcClientError::Decode(format!(
                "{} response carries neither result nor error",
                method
            ))),
        }
    }
}

#[async_trait]
impl ChainSource for NearRpcClient {
    async fn latest_height(&self) -> Result<u64, RpcClientError> {
        let status = self.status().await?;
        Ok(status.sync_info.latest_block_height)
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockData, RpcClientError> {
        let view = self.block(height).await?;
        Ok(BlockData::from(view))
    }
}

/// The node reports missing or garbage-collected heights as a generic RPC
/// error; match on the known markers.
fn is_unknown_block(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("unknown_block")
        || lower.contains("unknown block")
        || lower.contains("not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_block_markers_are_recognized() {
        assert!(is_unknown_block("UNKNOWN_BLOCK"));
        assert!(is_unknown_block("DB Not Found Error: BLOCK HEIGHT 12"));
        assert!(!is_unknown_block("connection reset by peer"));
    }
}
