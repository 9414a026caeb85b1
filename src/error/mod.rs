// Error types for the folio gateway
// Author: kelexine (https://github.com/kelexine)

pub mod translator;

pub use translator::{ErrorTranslator, ProviderFailure};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Every failure the gateway can surface.
///
/// `Display` carries the operator-facing detail (logged, never returned);
/// [`GatewayError::user_message`] is what callers see. The type is `Clone`
/// so one generation outcome can be shared by every coalesced waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider rejected credential: {0}")]
    Auth(String),

    #[error("Provider rate limit: {0}")]
    RateLimit(String),

    #[error("Provider temporarily unavailable: {0}")]
    Transient(String),

    #[error("Provider returned empty text")]
    EmptyResponse,

    #[error("Generation failed: {0}")]
    Unknown(String),

    /// Startup-time configuration loading failure.
    #[error("Config loading error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Stable label used in logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation_error",
            GatewayError::Configuration(_) | GatewayError::Config(_) => "configuration_error",
            GatewayError::Auth(_) => "auth_error",
            GatewayError::RateLimit(_) => "rate_limit_error",
            GatewayError::Transient(_) => "transient_error",
            GatewayError::EmptyResponse => "empty_response_error",
            GatewayError::Unknown(_) => "unknown_error",
        }
    }

    /// Caller-safe message. Provider diagnostics never appear here.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation(msg) => msg.clone(),
            GatewayError::Configuration(_) | GatewayError::Config(_) => {
                "AI service is not configured. Please contact the site owner.".to_string()
            }
            GatewayError::Auth(_) => "AI service authentication failed: invalid API key.".to_string(),
            GatewayError::RateLimit(_) => {
                "Rate limit reached. Please wait a moment and try again.".to_string()
            }
            GatewayError::Transient(_) => {
                "The AI service is temporarily unavailable. Please try again shortly.".to_string()
            }
            GatewayError::EmptyResponse => {
                "The AI service returned an empty response. Please try rephrasing your question."
                    .to_string()
            }
            GatewayError::Unknown(_) => {
                "Failed to generate a response. Please try again later.".to_string()
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Convert GatewayError to HTTP responses for Axum
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.user_message() });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
