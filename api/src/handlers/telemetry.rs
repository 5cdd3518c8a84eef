// Node telemetry endpoint handler implementation

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
};
use serde_json::{Value, json};

use crate::error::ExplorerResult;
use crate::handlers::AppState;
use crate::models::{TelemetryReport, TelemetryTiming};

/// Handler for POST /node-telemetry - Records a validator node's last-seen
/// state. The reporting address is resolved from the request and stored
/// alongside the report; with a `debug` query parameter the handler returns
/// how long the upsert took instead of an empty object.
pub async fn post_node_telemetry(
    State(app_state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(report): Json<TelemetryReport>,
) -> ExplorerResult<Json<Value>> {
    let started = Instant::now();

    let ip_address = client_ip(&headers, &peer);
    let last_seen = chrono::Utc::now().timestamp_millis();

    app_state
        .repositories
        .node
        .upsert(&report, &ip_address, last_seen)
        .await?;

    tracing::debug!(
        node_id = %report.node_id,
        height = report.latest_block_height,
        ip = %ip_address,
        "node telemetry recorded"
    );

    if params.contains_key("debug") {
        let timing = TelemetryTiming {
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        return Ok(Json(json!(timing)));
    }

    Ok(Json(json!({})))
}

/// Resolve the reporting address: first entry of X-Forwarded-For when the
/// request came through a proxy, otherwise the TCP peer address.
fn client_ip(headers: &HeaderMap, peer: &SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.9:51234".parse().unwrap()
    }

    #[test]
    fn forwarded_list_takes_the_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 198.51.100.1"),
        );
        assert_eq!(client_ip(&headers, &peer()), "203.0.113.7");
    }

    #[test]
    fn missing_header_falls_back_to_peer() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, &peer()), "10.0.0.9");
    }

    #[test]
    fn empty_header_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers, &peer()), "10.0.0.9");
    }
}
