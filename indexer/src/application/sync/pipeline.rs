//! Bounded fetch-and-persist pipeline.
//!
//! The pipeline walks a height range downward, keeping at most
//! `fetch_queue_size` block requests outstanding. Completed requests are
//! detached in groups of `bulk_db_update_size` and committed by background
//! save tasks, of which at most `save_queue_size` run at once. Saturating
//! either bound blocks submission, which keeps memory proportional to
//! `fetch_queue + save_queue * bulk` blocks.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::domain::chain::{ChainSource, ChainStore};
use crate::domain::models::BlockData;
use crate::infrastructure::rpc::RpcClientError;
use crate::utils::logging;

type FetchHandle = JoinHandle<(u64, Result<BlockData, RpcClientError>)>;

/// Fetches a descending height range and hands completed blocks to the
/// store in bulk transactions.
pub struct BlockPipeline<S, T> {
    source: Arc<S>,
    store: Arc<T>,
    fetch_queue_size: usize,
    save_queue_size: usize,
    bulk_size: usize,
}

impl<S, T> BlockPipeline<S, T>
where
    S: ChainSource + 'static,
    T: ChainStore + 'static,
{
    pub fn new(source: Arc<S>, store: Arc<T>, config: &SyncConfig) -> Self {
        Self {
            source,
            store,
            fetch_queue_size: config.fetch_queue_size.max(1),
            save_queue_size: config.save_queue_size.max(1),
            bulk_size: config.bulk_db_update_size.max(1),
        }
    }

    /// Fetch and persist every height in `[low, high]`, walking downward.
    ///
    /// Individual fetch failures are logged and dropped; the enclosing pass
    /// keeps going and a later gap sync retries the missing heights. The
    /// call returns once every batch it submitted has been committed or
    /// dropped.
    pub async fn run(&self, low: u64, high: u64) {
        if high < low {
            return;
        }

        let mut fetches: VecDeque<FetchHandle> = VecDeque::new();
        let mut saves: VecDeque<JoinHandle<()>> = VecDeque::new();

        let mut height = high;
        loop {
            if fetches.len() >= self.fetch_queue_size {
                let batch = drain_completed(&mut fetches, self.bulk_size).await;
                self.submit(batch, &mut saves).await;
            }

            let source = Arc::clone(&self.source);
            fetches.push_back(tokio::spawn(async move {
                let result = source.fetch_block(height).await;
                (height, result)
            }));

            if height == low {
                break;
            }
            height -= 1;
        }

        // Flush the residual requests as one final batch.
        let rest = fetches.len();
        let batch = drain_completed(&mut fetches, rest).await;
        self.submit(batch, &mut saves).await;

        while let Some(save) = saves.pop_front() {
            save.await.ok();
        }
    }

    /// Hand one batch to a background save task, waiting out the oldest
    /// save first when the save queue is full.
    async fn submit(&self, batch: Vec<BlockData>, saves: &mut VecDeque<JoinHandle<()>>) {
        if batch.is_empty() {
            return;
        }

        while saves.len() >= self.save_queue_size {
            if let Some(save) = saves.pop_front() {
                save.await.ok();
            }
        }

        let store = Arc::clone(&self.store);
        saves.push_back(tokio::spawn(async move {
            let len = batch.len();
            if let Err(e) = store.store_blocks(batch).await {
                // The dropped heights become gaps for the next gap sync.
                logging::log_warning(&format!("Dropping batch of {} blocks: {}", len, e));
            }
        }));
    }
}

/// Await up to `take` of the oldest outstanding fetches, in submission
/// order, keeping the successful blocks.
async fn drain_completed(fetches: &mut VecDeque<FetchHandle>, take: usize) -> Vec<BlockData> {
    let mut batch = Vec::with_capacity(take);
    for _ in 0..take {
        let Some(handle) = fetches.pop_front() else {
            break;
        };
        match handle.await {
            Ok((_, Ok(block))) => batch.push(block),
            Ok((height, Err(e))) => {
                if e.is_transport() {
                    logging::log_info(&format!("Skipping block {}: {}", height, e));
                } else {
                    logging::log_warning(&format!("Skipping block {}: {}", height, e));
                }
            }
            Err(e) => {
                logging::log_error(&format!("Block fetch task failed: {}", e));
            }
        }
    }
    batch
}
