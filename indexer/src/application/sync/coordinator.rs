//! The three sync passes sharing one pipeline and one database.
//!
//! Their height ranges are disjoint by construction: new-tip works above
//! the highest stored height, old-history below the lowest, and gap sync
//! strictly between the two.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::config::SyncConfig;
use crate::domain::chain::{ChainSource, ChainStore};
use crate::domain::errors::SyncError;
use crate::utils::logging;

use super::pipeline::BlockPipeline;

pub struct SyncCoordinator<S, T> {
    source: Arc<S>,
    store: Arc<T>,
    pipeline: BlockPipeline<S, T>,
    fetch_queue_size: u64,
}

impl<S, T> SyncCoordinator<S, T>
where
    S: ChainSource + 'static,
    T: ChainStore + 'static,
{
    pub fn new(source: Arc<S>, store: Arc<T>, config: &SyncConfig) -> Self {
        let pipeline = BlockPipeline::new(Arc::clone(&source), Arc::clone(&store), config);
        Self {
            source,
            store,
            pipeline,
            fetch_queue_size: config.fetch_queue_size.max(1) as u64,
        }
    }

    /// Forward catch-up from the last stored height to the current tip.
    ///
    /// When `status()` fails the pass is abandoned; the next scheduled fire
    /// retries with a fresh tip.
    pub async fn sync_new_blocks(&self) -> Result<(), SyncError> {
        let last = self.store.max_height().await?.unwrap_or(0);
        let tip = self.source.latest_height().await?;
        logging::log_debug(&format!("New-tip sync over [{}, {}]", last + 1, tip));
        self.pipeline.run(last + 1, tip).await;
        Ok(())
    }

    /// Backfill history from just below the oldest stored height down to
    /// genesis. A no-op once height 1 has been stored, and on an empty
    /// store.
    pub async fn sync_old_blocks(&self) -> Result<(), SyncError> {
        let oldest = self.store.min_height().await?.unwrap_or(0);
        if oldest <= 1 {
            return Ok(());
        }
        logging::log_debug(&format!("Old-history sync over [1, {}]", oldest - 1));
        self.pipeline.run(1, oldest - 1).await;
        Ok(())
    }

    /// Fill holes strictly inside the stored range using recursive
    /// bisection, so dense regions cost one count query and no range wider
    /// than the fetch queue is ever fetched at once.
    pub async fn sync_missing_blocks(&self) -> Result<(), SyncError> {
        let (Some(min), Some(max)) = (self.store.min_height().await?, self.store.max_height().await?)
        else {
            return Ok(());
        };
        if max <= min + 1 {
            return Ok(());
        }
        self.fill_gaps(min + 1, max - 1).await
    }

    fn fill_gaps(&self, low: u64, high: u64) -> BoxFuture<'_, Result<(), SyncError>> {
        Box::pin(async move {
            if high < low {
                return Ok(());
            }

            let present = self.store.count_in_range(low, high).await?;
            if present == high - low + 1 {
                return Ok(());
            }

            if high - low <= self.fetch_queue_size && present == 0 {
                logging::log_debug(&format!("Gap sync fetching [{}, {}]", low, high));
                self.pipeline.run(low, high).await;
                return Ok(());
            }

            let mid = low + (high - low) / 2;
            self.fill_gaps(low, mid).await?;
            self.fill_gaps(mid + 1, high).await
        })
    }

    /// Startup sequence: new-tip, then gap, then old-history. Each pass is
    /// guarded so one failing never skips the others.
    pub async fn full_sync(&self) {
        if let Err(e) = self.sync_new_blocks().await {
            logging::log_warning(&format!("New-tip sync failed: {}", e));
        }
        if let Err(e) = self.sync_missing_blocks().await {
            logging::log_warning(&format!("Gap sync failed: {}", e));
        }
        if let Err(e) = self.sync_old_blocks().await {
            logging::log_warning(&format!("Old-history sync failed: {}", e));
        }
    }
}
