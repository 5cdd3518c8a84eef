// Database Module
// This module handles database operations for the NEAR Explorer API

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::ApiConfig;

pub mod repositories;

pub use repositories::{NodeRepository, QueryRepository};

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),
}

impl From<sea_orm::DbErr> for DbError {
    fn from(err: sea_orm::DbErr) -> Self {
        DbError::QueryError(err.to_string())
    }
}

/// Database connection pool for managing database connections
pub struct DbPool {
    pool: DatabaseConnection,
    readonly_pool: DatabaseConnection,
}

impl DbPool {
    /// Create a new database connection pool from configuration.
    ///
    /// Two pools are opened: the main one for telemetry upserts and a
    /// read-only one that backs the select pass-through.
    pub async fn new(config: &ApiConfig) -> Result<Self, DbError> {
        let pool = connect(&config.database_url).await?;
        let readonly_pool = connect(&config.database_readonly_url).await?;

        Ok(DbPool {
            pool,
            readonly_pool,
        })
    }

    /// Get a reference to the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.pool
    }

    /// Create repositories for database operations
    pub fn repositories(&self) -> Repositories {
        Repositories {
            node: NodeRepository::new(self.pool.clone()),
            query: QueryRepository::new(self.readonly_pool.clone()),
        }
    }
}

async fn connect(url: &str) -> Result<DatabaseConnection, DbError> {
    // Default connection pool settings
    let conn_opts = ConnectOptions::new(url.to_string())
        .max_connections(10)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false)
        .to_owned();

    Database::connect(conn_opts)
        .await
        .map_err(|e| DbError::ConnectionError(e.to_string()))
}

/// Container for all repositories
pub struct Repositories {
    pub node: NodeRepository,
    pub query: QueryRepository,
}
