//! Wire shapes of the nearcore JSON-RPC responses we consume.

use serde::Deserialize;
use serde_json::Value;

/// Response of the `status` method, reduced to the fields we read
#[derive(Debug, Clone, Deserialize)]
pub struct StatusView {
    pub sync_info: SyncInfoView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfoView {
    pub latest_block_height: u64,
}

/// Response of the `block` method
#[derive(Debug, Clone, Deserialize)]
pub struct BlockView {
    pub header: BlockHeaderView,
    #[serde(default)]
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeaderView {
    pub hash: String,
    pub height: u64,
    pub prev_hash: String,
    /// Block timestamp in nanoseconds since epoch
    #[serde(rename = "timestamp")]
    pub timestamp_ns: u64,
    pub total_weight: WeightView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightView {
    pub num: u64,
}

/// A transaction embedded in a block. The body is a single-key map whose
/// key is the transaction kind and whose value is the kind's arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionView {
    pub hash: String,
    #[serde(default)]
    pub body: Value,
}
