// Provider failure classification
// Author: kelexine (https://github.com/kelexine)

use super::GatewayError;
use serde::Deserialize;

/// Raw failure observed while talking to the provider, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// No API key configured; no request was sent.
    MissingCredential,
    /// Provider answered with a non-success status.
    Http { status: u16, body: String },
    /// Request never produced a response.
    Transport {
        message: String,
        timed_out: bool,
        connect: bool,
    },
    /// Provider answered 200 with a body that is not a `generateContent` response.
    MalformedBody { message: String },
    /// Provider answered 200 but the extracted text was blank.
    EmptyText,
}

/// Maps provider failures onto the closed [`GatewayError`] taxonomy.
///
/// Classification order for HTTP failures, first match wins:
/// 1. structured `error.status` / `error.details[].reason` from the Google error envelope
/// 2. the HTTP status code
/// 3. substring matching on the error message
pub struct ErrorTranslator;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Auth,
    RateLimit,
    Transient,
}

impl ErrorTranslator {
    pub fn translate(failure: &ProviderFailure) -> GatewayError {
        match failure {
            ProviderFailure::MissingCredential => {
                GatewayError::Configuration("Gemini API key is not configured".to_string())
            }
            ProviderFailure::EmptyText => GatewayError::EmptyResponse,
            ProviderFailure::MalformedBody { message } => {
                GatewayError::Unknown(format!("unparseable response: {}", message))
            }
            ProviderFailure::Transport {
                message,
                timed_out,
                connect,
            } => {
                if *timed_out {
                    GatewayError::Transient(format!("request timed out: {}", message))
                } else if *connect {
                    GatewayError::Transient(format!("connection failed: {}", message))
                } else {
                    GatewayError::Unknown(message.clone())
                }
            }
            ProviderFailure::Http { status, body } => Self::translate_http(*status, body),
        }
    }

    fn translate_http(status: u16, body: &str) -> GatewayError {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error);
        let message = envelope
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| body.to_string());
        let detail = format!("HTTP {}: {}", status, message);

        let category = envelope
            .as_ref()
            .and_then(Self::from_structured)
            .or_else(|| Self::from_status(status))
            .or_else(|| Self::from_message(&message));

        match category {
            Some(Category::Auth) => GatewayError::Auth(detail),
            Some(Category::RateLimit) => GatewayError::RateLimit(detail),
            Some(Category::Transient) => GatewayError::Transient(detail),
            None => GatewayError::Unknown(detail),
        }
    }

    fn from_structured(body: &ErrorBody) -> Option<Category> {
        if body
            .details
            .iter()
            .filter_map(|d| d.reason.as_deref())
            .any(|r| r == "API_KEY_INVALID" || r == "API_KEY_EXPIRED")
        {
            return Some(Category::Auth);
        }
        match body.status.as_deref()? {
            "UNAUTHENTICATED" | "PERMISSION_DENIED" => Some(Category::Auth),
            "RESOURCE_EXHAUSTED" => Some(Category::RateLimit),
            "UNAVAILABLE" | "INTERNAL" => Some(Category::Transient),
            _ => None,
        }
    }

    fn from_status(status: u16) -> Option<Category> {
        match status {
            401 | 403 => Some(Category::Auth),
            429 => Some(Category::RateLimit),
            500 | 503 => Some(Category::Transient),
            _ => None,
        }
    }

    // Phrases only; the status code is already known, and bare digits occur in token counts.
    fn from_message(message: &str) -> Option<Category> {
        let lower = message.to_lowercase();
        if lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
            || lower.contains("invalid api key")
        {
            Some(Category::Auth)
        } else if lower.contains("too many requests")
            || lower.contains("rate limit")
            || lower.contains("quota")
        {
            Some(Category::RateLimit)
        } else if lower.contains("service unavailable")
            || lower.contains("temporarily unavailable")
            || lower.contains("overloaded")
        {
            Some(Category::Transient)
        } else {
            None
        }
    }
}
