use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::AppConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Manages the database connection pool shared by all sync passes.
///
/// The save queue draws its transactions from this pool, so the pool is
/// sized above the save queue bound with headroom for watermark reads.
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Creates a new database connection pool
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        let pool_size = (config.sync.save_queue_size + 4) as u32;
        let options = ConnectOptions::new(config.database.url.clone())
            .max_connections(pool_size)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false)
            .to_owned();

        match Database::connect(options).await {
            Ok(connection) => {
                logging::log_info(&format!(
                    "Database connection established ({} connections)",
                    pool_size
                ));
                Ok(DbPool { connection })
            }
            Err(e) => Err(DbError::ConnectionError(format!(
                "Failed to connect to database: {}",
                e
            ))),
        }
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
