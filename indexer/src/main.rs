//! NEAR Explorer indexer - chain sync daemon
//!
//! Runs an initial full sync (new-tip, gap, old-history) and then keeps
//! the store current with two periodic timers until interrupted.

use std::sync::Arc;

use explorer_indexer::application::sync::{spawn_sync_timers, SyncCoordinator};
use explorer_indexer::config::AppConfig;
use explorer_indexer::infrastructure::persistence::{ChainRepository, DbPool};
use explorer_indexer::infrastructure::rpc::NearRpcClient;
use explorer_indexer::utils::logging;

#[tokio::main]
async fn main() {
    logging::init_logger();

    let config = AppConfig::from_env();

    // Connect to database
    let db_pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            logging::log_error(&format!("Failed to connect to database: {}", e));
            return;
        }
    };

    let repository = Arc::new(ChainRepository::new(db_pool.get_connection().clone()));
    let rpc_client = Arc::new(NearRpcClient::new(&config));
    let coordinator = Arc::new(SyncCoordinator::new(rpc_client, repository, &config.sync));

    logging::log_info(&format!("Starting initial full sync from {}", config.rpc.url));
    coordinator.full_sync().await;
    logging::log_info("Initial full sync finished; switching to periodic sync");

    let timers = spawn_sync_timers(Arc::clone(&coordinator), &config.sync);

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");

    logging::log_info("Shutting down...");
    for timer in timers {
        timer.abort();
    }
}
