// folio-gateway - cached Gemini prompt gateway for a portfolio site
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use folio_gateway::cache::ResponseCache;
use folio_gateway::cli::Args;
use folio_gateway::config::AppConfig;
use folio_gateway::gateway::PromptGateway;
use folio_gateway::gemini::GeminiClient;
use folio_gateway::server::create_router;
use folio_gateway::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting folio-gateway v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Validate configuration (problems are reported, not fatal)
    for warning in config.validate() {
        warn!("{}", warning);
    }

    // Phase 4: Build generation client and response cache
    let generator = GeminiClient::new(&config.gemini, &config.performance)?;
    info!("Gemini model: {}", generator.model());

    let cache = ResponseCache::new(config.cache.clone());
    let sweeper = (config.cache.sweep_interval_seconds > 0).then(|| {
        cache.spawn_sweeper(Duration::from_secs(config.cache.sweep_interval_seconds))
    });
    info!(
        "Response cache ready (ttl {}s, max entries {}, coalescing {})",
        config.cache.ttl_seconds, config.cache.max_entries, config.cache.coalesce_inflight
    );

    let gateway = PromptGateway::new(cache, Arc::new(generator), config.gateway.clone());

    // Phase 5: Build and start HTTP server
    let app = create_router(config.clone(), gateway)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
