//! Structured logging and secret redaction utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing a filter that keeps
//! Google API keys out of logged provider errors.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{GatewayError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| GatewayError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
    };

    installed.map_err(|e| GatewayError::Config(format!("Failed to install logger: {}", e)))
}

static API_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
static KEY_PARAM_REGEX: OnceLock<Regex> = OnceLock::new();

/// Sanitizes sensitive information from log messages.
///
/// Google API keys (`AIza` followed by 35 URL-safe characters) and `key=`
/// query parameters are replaced with a `\[REDACTED\]` placeholder.
pub fn sanitize(input: &str) -> String {
    let api_key = API_KEY_REGEX
        .get_or_init(|| Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("Invalid regex pattern"));
    let key_param = KEY_PARAM_REGEX
        .get_or_init(|| Regex::new(r"([?&]key=)[^&\s\x22']+").expect("Invalid regex pattern"));

    let redacted = api_key.replace_all(input, "[REDACTED_API_KEY]");
    key_param
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
