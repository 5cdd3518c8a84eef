use std::error::Error;
use std::fmt;

use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::rpc::RpcClientError;

/// Error type for sync pass failures.
///
/// A failed pass is never fatal: the scheduler logs it and fires the pass
/// again on its next period, and the gap sync backfills whatever the
/// failure left behind.
#[derive(Debug)]
pub enum SyncError {
    RpcClientError(RpcClientError),
    DbError(DbError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::RpcClientError(e) => write!(f, "RPC client error: {}", e),
            SyncError::DbError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SyncError::RpcClientError(e) => Some(e),
            SyncError::DbError(e) => Some(e),
        }
    }
}

impl From<RpcClientError> for SyncError {
    fn from(error: RpcClientError) -> Self {
        SyncError::RpcClientError(error)
    }
}

impl From<DbError> for SyncError {
    fn from(error: DbError) -> Self {
        SyncError::DbError(error)
    }
}
