// Gemini API client
// Author: kelexine (https://github.com/kelexine)

use super::models::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SystemInstruction,
};
use super::{extract_text, TextGenerator, SYSTEM_INSTRUCTION};
use crate::config::{GeminiConfig, PerformanceConfig};
use crate::error::{ErrorTranslator, GatewayError, ProviderFailure, Result};
use crate::utils::logging::sanitize;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

/// Client for the Google Generative Language API.
///
/// Sends one `generateContent` request per [`TextGenerator::generate`] call,
/// with the fixed persona and generation settings from [`GeminiConfig`].
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
    api_key: Option<Zeroizing<String>>,
}

impl GeminiClient {
    /// Build the HTTP client. A missing API key is not an error here; every
    /// generation then fails with a configuration error without touching the network.
    pub fn new(config: &GeminiConfig, performance: &PerformanceConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(performance.connection_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
            api_key: config.api_key().map(|k| Zeroizing::new(k.to_string())),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            }),
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            }),
        }
    }

    /// Perform the upstream call, reporting failures in their raw form.
    async fn call(&self, prompt: &str) -> std::result::Result<String, ProviderFailure> {
        let api_key = self.api_key.as_ref().ok_or(ProviderFailure::MissingCredential)?;

        let url = self.endpoint();
        debug!("Calling generateContent for model: {}", self.config.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key.as_str())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport {
                message: e.to_string(),
                timed_out: e.is_timeout(),
                connect: e.is_connect(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ProviderFailure::Transport {
            message: format!("Failed to read response body: {}", e),
            timed_out: e.is_timeout(),
            connect: false,
        })?;

        if !status.is_success() {
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&body)
            );
            return Err(ProviderFailure::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            ProviderFailure::MalformedBody {
                message: e.to_string(),
            }
        })?;

        let text = extract_text(&parsed);
        if text.is_empty() {
            let reason = parsed
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
                .or_else(|| parsed.candidates.first().and_then(|c| c.finish_reason.clone()));
            warn!("Gemini returned no usable text (reason: {:?})", reason);
            return Err(ProviderFailure::EmptyText);
        }

        Ok(text)
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            let start = Instant::now();
            let result = self.call(prompt).await.map_err(|failure| {
                let translated = ErrorTranslator::translate(&failure);
                warn!(
                    category = translated.category(),
                    "Generation failed: {}",
                    sanitize(&translated.to_string())
                );
                translated
            });

            let outcome = match &result {
                Ok(_) => "success",
                Err(e) => e.category(),
            };
            crate::metrics::record_generation(outcome, start.elapsed().as_secs_f64());
            result
        }
        .boxed()
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
