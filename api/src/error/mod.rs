use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let (status, err_msg) = match self {
            ExplorerError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ExplorerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": err_msg
        }));

        (status, body).into_response()
    }
}

impl From<DbError> for ExplorerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionError(msg) => ExplorerError::DatabaseError(msg),
            DbError::QueryError(msg) => ExplorerError::DatabaseError(msg),
            DbError::InvalidParameter(msg) => ExplorerError::InvalidRequest(msg),
        }
    }
}
