// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    get_response_handler, health_handler, metrics_handler, root_handler, test_handler,
};
use super::middleware::{cors_layer, request_id_layers};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::PromptGateway;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<PromptGateway>,
    pub started_at: Instant,
}

pub fn create_router(config: AppConfig, gateway: PromptGateway) -> Result<Router> {
    let (set_request_id, propagate_request_id) = request_id_layers();
    let cors = cors_layer(&config.server);
    let body_limit = config.performance.request_body_limit_bytes;
    let compress = config.performance.enable_compression;

    let state = AppState {
        config,
        gateway: Arc::new(gateway),
        started_at: Instant::now(),
    };

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ai/test", get(test_handler))
        .route("/ai/get-response", post(get_response_handler))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(body_limit))
        .layer(cors);

    if compress {
        app = app.layer(CompressionLayer::new());
    }

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id)
                .layer(propagate_request_id)
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state);

    Ok(app)
}
