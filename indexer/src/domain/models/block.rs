use serde_json::Value;

use crate::infrastructure::rpc::types::BlockView;

/// Placeholder for header fields the current chain version does not expose
const UNAVAILABLE: &str = "n/a";

/// A fetched block in its persistable form, together with the chunk and
/// transaction rows derived from it.
#[derive(Debug, Clone)]
pub struct BlockData {
    pub hash: String,
    pub height: u64,
    pub prev_hash: String,
    /// Milliseconds since epoch, truncated from the header's nanoseconds
    pub timestamp: i64,
    pub weight: u64,
    pub author_id: String,
    pub list_of_approvals: String,
    pub chunks: Vec<ChunkData>,
    pub transactions: Vec<TransactionData>,
}

#[derive(Debug, Clone)]
pub struct ChunkData {
    pub hash: String,
    pub block_hash: String,
    pub shard_id: String,
    pub author_id: String,
}

#[derive(Debug, Clone)]
pub struct TransactionData {
    pub hash: String,
    pub originator: String,
    pub destination: String,
    /// The single key of the body discriminator map
    pub kind: String,
    /// The payload stored under that key
    pub args: Value,
    pub chunk_hash: String,
    pub status: String,
    pub logs: String,
}

impl From<BlockView> for BlockData {
    fn from(view: BlockView) -> Self {
        let block_hash = view.header.hash.clone();

        // The current chain version carries exactly one chunk per block and
        // identifies it by the block hash.
        let chunks = vec![ChunkData {
            hash: block_hash.clone(),
            block_hash: block_hash.clone(),
            shard_id: "0".to_string(),
            author_id: UNAVAILABLE.to_string(),
        }];

        let transactions = view
            .transactions
            .into_iter()
            .map(|tx| {
                let (kind, args) = split_body(&tx.body);
                let originator = args
                    .get("originator")
                    .and_then(Value::as_str)
                    .unwrap_or(UNAVAILABLE)
                    .to_string();
                TransactionData {
                    hash: tx.hash,
                    originator,
                    destination: UNAVAILABLE.to_string(),
                    kind,
                    args,
                    chunk_hash: block_hash.clone(),
                    status: "Completed".to_string(),
                    logs: String::new(),
                }
            })
            .collect();

        BlockData {
            hash: block_hash,
            height: view.header.height,
            prev_hash: view.header.prev_hash,
            timestamp: (view.header.timestamp_ns / 1_000_000) as i64,
            weight: view.header.total_weight.num,
            author_id: UNAVAILABLE.to_string(),
            list_of_approvals: UNAVAILABLE.to_string(),
            chunks,
            transactions,
        }
    }
}

/// Split a transaction body map into its discriminator key and payload
fn split_body(body: &Value) -> (String, Value) {
    match body.as_object().and_then(|map| map.iter().next()) {
        Some((kind, args)) => (kind.clone(), args.clone()),
        None => (String::new(), Value::Null),
    }
}
