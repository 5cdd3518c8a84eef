// Read-only select pass-through endpoint handler implementation

use axum::{Json, extract::State};
use serde_json::Value;

use crate::error::ExplorerResult;
use crate::handlers::AppState;
use crate::models::SelectRequest;

/// Handler for POST /select - Executes a parameterised query through the
/// read-only database role and returns its rows as JSON objects.
pub async fn post_select(
    State(app_state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> ExplorerResult<Json<Vec<Value>>> {
    let rows = app_state
        .repositories
        .query
        .select(&request.query, request.replacements)
        .await?;

    Ok(Json(rows))
}
