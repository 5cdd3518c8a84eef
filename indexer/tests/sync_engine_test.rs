//! End-to-end tests for the sync engine, driven against an in-memory chain
//! and store so every scenario is deterministic.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use explorer_indexer::application::sync::SyncCoordinator;
use explorer_indexer::config::SyncConfig;
use explorer_indexer::domain::chain::{ChainSource, ChainStore};
use explorer_indexer::domain::models::{BlockData, ChunkData, TransactionData};
use explorer_indexer::infrastructure::persistence::error::DbError;
use explorer_indexer::infrastructure::rpc::RpcClientError;

fn test_config(fetch: usize, save: usize, bulk: usize) -> SyncConfig {
    SyncConfig {
        fetch_queue_size: fetch,
        save_queue_size: save,
        bulk_db_update_size: bulk,
        new_state_interval_ms: 1000,
        missing_state_interval_ms: 60000,
    }
}

fn make_block(height: u64) -> BlockData {
    let hash = format!("hash-{}", height);
    BlockData {
        hash: hash.clone(),
        height,
        prev_hash: format!("hash-{}", height.saturating_sub(1)),
        timestamp: height as i64 * 1_000,
        weight: height * 10,
        author_id: "n/a".to_string(),
        list_of_approvals: "n/a".to_string(),
        chunks: vec![ChunkData {
            hash: hash.clone(),
            block_hash: hash.clone(),
            shard_id: "0".to_string(),
            author_id: "n/a".to_string(),
        }],
        transactions: vec![TransactionData {
            hash: format!("tx-{}", height),
            originator: "alice".to_string(),
            destination: "n/a".to_string(),
            kind: "SendMoney".to_string(),
            args: json!({ "amount": 1 }),
            chunk_hash: hash,
            status: "Completed".to_string(),
            logs: String::new(),
        }],
    }
}

/// Fake chain node: serves generated blocks up to `tip`, with configurable
/// missing heights, and records request concurrency.
struct MockChain {
    tip: u64,
    status_fails: bool,
    missing: Mutex<HashSet<u64>>,
    fetched: Mutex<Vec<u64>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockChain {
    fn new(tip: u64) -> Self {
        Self {
            tip,
            status_fails: false,
            missing: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn with_missing(tip: u64, missing: &[u64]) -> Self {
        let chain = Self::new(tip);
        chain.missing.lock().unwrap().extend(missing.iter().copied());
        chain
    }

    fn clear_missing(&self) {
        self.missing.lock().unwrap().clear();
    }

    fn fetched_heights(&self) -> HashSet<u64> {
        self.fetched.lock().unwrap().iter().copied().collect()
    }

    fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainSource for MockChain {
    async fn latest_height(&self) -> Result<u64, RpcClientError> {
        if self.status_fails {
            return Err(RpcClientError::Transport("connection refused".to_string()));
        }
        Ok(self.tip)
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockData, RpcClientError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.fetched.lock().unwrap().push(height);
        if self.missing.lock().unwrap().contains(&height) {
            return Err(RpcClientError::UnknownBlock(height));
        }
        Ok(make_block(height))
    }
}

/// Fake store: a height-keyed map plus counters for transaction
/// concurrency and a set of heights whose batches are made to fail.
struct MemoryStore {
    rows: Mutex<BTreeMap<u64, BlockData>>,
    failing: Mutex<HashSet<u64>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(HashSet::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn with_heights(heights: &[u64]) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap();
            for &height in heights {
                rows.insert(height, make_block(height));
            }
        }
        store
    }

    fn fail_batches_containing(&self, heights: &[u64]) {
        self.failing.lock().unwrap().extend(heights.iter().copied());
    }

    fn stop_failing(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn heights(&self) -> Vec<u64> {
        self.rows.lock().unwrap().keys().copied().collect()
    }

    fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainStore for MemoryStore {
    async fn max_height(&self) -> Result<Option<u64>, DbError> {
        Ok(self.rows.lock().unwrap().keys().next_back().copied())
    }

    async fn min_height(&self) -> Result<Option<u64>, DbError> {
        Ok(self.rows.lock().unwrap().keys().next().copied())
    }

    async fn count_in_range(&self, low: u64, high: u64) -> Result<u64, DbError> {
        Ok(self.rows.lock().unwrap().range(low..=high).count() as u64)
    }

    async fn store_blocks(&self, batch: Vec<BlockData>) -> Result<(), DbError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let rejected = {
            let failing = self.failing.lock().unwrap();
            batch.iter().any(|b| failing.contains(&b.height))
        };
        if rejected {
            return Err(DbError::QueryError("injected batch failure".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        for block in batch {
            rows.insert(block.height, block);
        }
        Ok(())
    }
}

fn coordinator(
    chain: &Arc<MockChain>,
    store: &Arc<MemoryStore>,
    config: &SyncConfig,
) -> SyncCoordinator<MockChain, MemoryStore> {
    SyncCoordinator::new(Arc::clone(chain), Arc::clone(store), config)
}

#[tokio::test]
async fn empty_store_catches_up_to_tip() {
    let chain = Arc::new(MockChain::new(5));
    let store = Arc::new(MemoryStore::new());
    let sync = coordinator(&chain, &store, &test_config(1000, 10, 10));

    sync.full_sync().await;

    assert_eq!(store.heights(), vec![1, 2, 3, 4, 5]);
    // New-tip covered the whole range; gap and old-history had nothing to
    // fetch, so every height was requested exactly once.
    assert_eq!(chain.fetched.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn passes_cover_disjoint_ranges() {
    let chain = Arc::new(MockChain::new(5));
    let store = Arc::new(MemoryStore::with_heights(&[3]));
    let sync = coordinator(&chain, &store, &test_config(1000, 10, 10));

    sync.full_sync().await;

    assert_eq!(store.heights(), vec![1, 2, 3, 4, 5]);
    // Height 3 was already stored and belongs to no pass's range.
    let fetched = chain.fetched_heights();
    assert_eq!(fetched, HashSet::from([1, 2, 4, 5]));
}

#[tokio::test]
async fn gap_sync_bisects_down_to_missing_heights() {
    let chain = Arc::new(MockChain::new(5));
    let store = Arc::new(MemoryStore::with_heights(&[1, 3, 5]));
    let sync = coordinator(&chain, &store, &test_config(2, 10, 10));

    sync.sync_missing_blocks().await.expect("gap sync failed");

    assert_eq!(store.heights(), vec![1, 2, 3, 4, 5]);
    // Bisection narrows to the holes; covered heights are never refetched.
    assert_eq!(chain.fetched_heights(), HashSet::from([2, 4]));
}

#[tokio::test]
async fn missing_block_is_dropped_and_refilled_later() {
    let chain = Arc::new(MockChain::with_missing(5, &[2]));
    let store = Arc::new(MemoryStore::new());
    let sync = coordinator(&chain, &store, &test_config(1000, 10, 10));

    sync.full_sync().await;
    assert_eq!(store.heights(), vec![1, 3, 4, 5]);

    // The node recovers the block; the next gap sync fills it in.
    chain.clear_missing();
    sync.sync_missing_blocks().await.expect("gap sync failed");
    assert_eq!(store.heights(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn failed_batch_is_dropped_and_resynced() {
    let chain = Arc::new(MockChain::new(5));
    let store = Arc::new(MemoryStore::new());
    // Bulk of 2 with a fetch queue of 2 detaches {5, 4} as the first batch.
    let sync = coordinator(&chain, &store, &test_config(2, 10, 2));

    store.fail_batches_containing(&[4, 5]);
    sync.sync_new_blocks().await.expect("new-tip sync failed");
    assert_eq!(store.heights(), vec![1, 2, 3]);

    // Heights 4 and 5 sit above the stored watermark again, so the next
    // new-tip pass refetches them.
    store.stop_failing();
    sync.sync_new_blocks().await.expect("new-tip sync failed");
    assert_eq!(store.heights(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn status_failure_abandons_the_pass() {
    let mut chain = MockChain::new(5);
    chain.status_fails = true;
    let chain = Arc::new(chain);
    let store = Arc::new(MemoryStore::new());
    let sync = coordinator(&chain, &store, &test_config(1000, 10, 10));

    assert!(sync.sync_new_blocks().await.is_err());
    assert!(store.heights().is_empty());
    assert!(chain.fetched_heights().is_empty());
}

#[tokio::test]
async fn persisting_twice_is_idempotent() {
    let store = MemoryStore::new();
    let batch: Vec<BlockData> = (1..=4).map(make_block).collect();

    store.store_blocks(batch.clone()).await.expect("first persist failed");
    let after_first = store.heights();

    store.store_blocks(batch).await.expect("second persist failed");
    assert_eq!(store.heights(), after_first);
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_respects_fetch_and_save_bounds() {
    let tip = 100_000;
    let chain = Arc::new(MockChain::new(tip));
    let store = Arc::new(MemoryStore::new());
    let sync = coordinator(&chain, &store, &test_config(10, 2, 5));

    sync.sync_new_blocks().await.expect("new-tip sync failed");

    assert_eq!(store.heights().len() as u64, tip);
    assert!(
        chain.peak_concurrency() <= 10,
        "peak concurrent fetches was {}",
        chain.peak_concurrency()
    );
    assert!(
        store.peak_concurrency() <= 2,
        "peak concurrent saves was {}",
        store.peak_concurrency()
    );
}
