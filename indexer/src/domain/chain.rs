use async_trait::async_trait;

use crate::domain::models::BlockData;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::rpc::RpcClientError;

/// Read side of the sync engine: the chain we index.
///
/// Implemented by the JSON-RPC client in production and by in-memory fakes
/// in tests.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Current tip height as reported by the node
    async fn latest_height(&self) -> Result<u64, RpcClientError>;

    /// Fetch the block at the given height in its persistable form
    async fn fetch_block(&self, height: u64) -> Result<BlockData, RpcClientError>;
}

/// Write side of the sync engine: the relational store the passes share.
///
/// The three passes communicate solely through these watermark reads; there
/// is no other shared mutable state.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Highest stored block height, if any
    async fn max_height(&self) -> Result<Option<u64>, DbError>;

    /// Lowest stored block height, if any
    async fn min_height(&self) -> Result<Option<u64>, DbError>;

    /// Number of stored blocks with height in `[low, high]`
    async fn count_in_range(&self, low: u64, high: u64) -> Result<u64, DbError>;

    /// Persist a batch of blocks with their chunks and transactions in one
    /// database transaction. Must be idempotent per primary key.
    async fn store_blocks(&self, batch: Vec<BlockData>) -> Result<(), DbError>;
}
