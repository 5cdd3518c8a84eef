use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::chain::ChainStore;
use crate::domain::models::BlockData;
use crate::infrastructure::persistence::entities::{blocks, chunks, transactions};
use crate::infrastructure::persistence::error::DbError;

/// Repository for the blocks / chunks / transactions tables
#[derive(Clone)]
pub struct ChainRepository {
    conn: DatabaseConnection,
}

impl ChainRepository {
    /// Create a new ChainRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Highest stored block height
    pub async fn max_height(&self) -> Result<Option<u64>, DbError> {
        let row = blocks::Entity::find()
            .order_by_desc(blocks::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(row.map(|b| b.height as u64))
    }

    /// Lowest stored block height
    pub async fn min_height(&self) -> Result<Option<u64>, DbError> {
        let row = blocks::Entity::find()
            .order_by_asc(blocks::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(row.map(|b| b.height as u64))
    }

    /// Number of stored blocks with height in `[low, high]`
    pub async fn count_in_range(&self, low: u64, high: u64) -> Result<u64, DbError> {
        let count = blocks::Entity::find()
            .filter(blocks::Column::Height.between(low as i64, high as i64))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Persist a batch of blocks with their chunks and transactions in a
    /// single database transaction.
    ///
    /// Rows already present are left untouched; re-persisting a block is a
    /// no-op per primary key. On any failure the transaction rolls back and
    /// no partial rows stay visible.
    pub async fn store_batch(&self, batch: Vec<BlockData>) -> Result<(), DbError> {
        if batch.is_empty() {
            return Ok(());
        }

        let txn = self.conn.begin().await?;
        match insert_batch(&txn, batch).await {
            Ok(()) => {
                txn.commit().await?;
                Ok(())
            }
            Err(e) => {
                txn.rollback().await.ok();
                Err(e.into())
            }
        }
    }
}

async fn insert_batch(txn: &DatabaseTransaction, batch: Vec<BlockData>) -> Result<(), DbErr> {
    let mut block_models = Vec::with_capacity(batch.len());
    let mut chunk_models = Vec::new();
    let mut transaction_models = Vec::new();

    for block in batch {
        block_models.push(blocks::ActiveModel {
            hash: Set(block.hash),
            height: Set(block.height as i64),
            prev_hash: Set(block.prev_hash),
            timestamp: Set(block.timestamp),
            weight: Set(block.weight as i64),
            author_id: Set(block.author_id),
            list_of_approvals: Set(block.list_of_approvals),
        });

        for chunk in block.chunks {
            chunk_models.push(chunks::ActiveModel {
                hash: Set(chunk.hash),
                block_hash: Set(chunk.block_hash),
                shard_id: Set(chunk.shard_id),
                author_id: Set(chunk.author_id),
            });
        }

        for tx in block.transactions {
            transaction_models.push(transactions::ActiveModel {
                hash: Set(tx.hash),
                originator: Set(tx.originator),
                destination: Set(tx.destination),
                kind: Set(tx.kind),
                args: Set(tx.args),
                chunk_hash: Set(tx.chunk_hash),
                status: Set(tx.status),
                logs: Set(tx.logs),
            });
        }
    }

    let inserted = blocks::Entity::insert_many(block_models)
        .on_conflict(
            OnConflict::column(blocks::Column::Hash)
                .do_nothing()
                .to_owned(),
        )
        .exec(txn)
        .await;
    ignore_all_conflicting(inserted)?;

    if !chunk_models.is_empty() {
        let inserted = chunks::Entity::insert_many(chunk_models)
            .on_conflict(
                OnConflict::column(chunks::Column::Hash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(txn)
            .await;
        ignore_all_conflicting(inserted)?;
    }

    if !transaction_models.is_empty() {
        let inserted = transactions::Entity::insert_many(transaction_models)
            .on_conflict(
                OnConflict::column(transactions::Column::Hash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(txn)
            .await;
        ignore_all_conflicting(inserted)?;
    }

    Ok(())
}

/// `insert_many` with a do-nothing conflict clause reports
/// `RecordNotInserted` when every row already existed; that is a benign
/// outcome for an idempotent store.
fn ignore_all_conflicting<T>(result: Result<T, DbErr>) -> Result<(), DbErr> {
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ChainStore for ChainRepository {
    async fn max_height(&self) -> Result<Option<u64>, DbError> {
        ChainRepository::max_height(self).await
    }

    async fn min_height(&self) -> Result<Option<u64>, DbError> {
        ChainRepository::min_height(self).await
    }

    async fn count_in_range(&self, low: u64, high: u64) -> Result<u64, DbError> {
        ChainRepository::count_in_range(self, low, high).await
    }

    async fn store_blocks(&self, batch: Vec<BlockData>) -> Result<(), DbError> {
        ChainRepository::store_batch(self, batch).await
    }
}
