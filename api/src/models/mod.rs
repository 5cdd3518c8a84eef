// Request and response shapes for the API endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Telemetry report posted by a validator node.
/// The reporting IP address is taken from the request, not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryReport {
    pub node_id: String,
    pub account_id: String,
    #[serde(default)]
    pub moniker: Option<String>,
    pub latest_block_height: u64,
}

/// A parameterised read-only query
#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    pub query: String,
    #[serde(default)]
    pub replacements: Vec<Value>,
}

/// Timing of a handled telemetry report, returned in debug mode
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryTiming {
    pub elapsed_ms: u64,
}
