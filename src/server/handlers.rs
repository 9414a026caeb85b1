// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Body of `POST /ai/get-response`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Success body of `POST /ai/get-response`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

/// Handler for `POST /ai/get-response`
pub async fn get_response_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    // A body that is not a JSON object with a string prompt counts as a missing prompt,
    // invalid UTF-8 included
    let request: PromptRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Unparseable prompt request body: {}", e);
        PromptRequest::default()
    });

    let response = match state.gateway.respond(request.prompt.as_deref()).await {
        Ok(text) => Json(PromptResponse { response: text }).into_response(),
        Err(e) => e.into_response(),
    };

    crate::metrics::record_request(
        "/ai/get-response",
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Handler for `GET /ai/test`, a static liveness probe for the AI route
pub async fn test_handler(method: Method, OriginalUri(uri): OriginalUri) -> Json<Value> {
    Json(json!({
        "message": "AI route is working",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "method": method.as_str(),
        "url": uri.to_string(),
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check credential presence
    let credential_check = if state.gateway.generator_configured() {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("Gemini model: {}", state.config.gemini.model),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: "Gemini API key not configured".to_string(),
        }
    };
    checks.insert("gemini_credentials".to_string(), credential_check);

    // Report cache occupancy
    let cache = state.gateway.cache();
    let stats = cache.stats();
    checks.insert(
        "response_cache".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "{} entries, {} in flight, {} hits, {} misses",
                cache.len(),
                cache.inflight(),
                stats.hits,
                stats.misses
            ),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Handler for `GET /`, service information
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "prompt": "POST /ai/get-response",
            "test": "GET /ai/test",
            "health": "GET /health",
            "metrics": "GET /metrics",
        },
    }))
}

/// Handler for `GET /metrics` in Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_with_cache_entries(state.gateway.cache().len()),
    )
}
