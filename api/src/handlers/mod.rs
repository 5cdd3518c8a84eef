// API endpoint handlers implementation

mod health;
mod select;
mod telemetry;

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Repositories;

// Handler function re-exports
pub use health::health_check;
pub use select::post_select;
pub use telemetry::post_node_telemetry;

/// Application state containing repositories and configuration
#[derive(Clone)]
pub struct AppState {
    pub repositories: Arc<Repositories>,
    pub config: ApiConfig,
}
