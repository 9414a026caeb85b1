// Prompt gateway - validation in front of the response cache
// Author: kelexine (https://github.com/kelexine)

use crate::cache::{key_fingerprint, normalize_key, ResponseCache};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gemini::TextGenerator;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const PROMPT_TOO_LONG: &str = "Prompt is too long";

/// Validates prompts and answers them through the cache.
///
/// Holds no per-call state; the cache and generator are injected at startup.
pub struct PromptGateway {
    cache: ResponseCache,
    generator: Arc<dyn TextGenerator>,
    config: GatewayConfig,
}

impl PromptGateway {
    pub fn new(cache: ResponseCache, generator: Arc<dyn TextGenerator>, config: GatewayConfig) -> Self {
        Self {
            cache,
            generator,
            config,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn generator_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Reject missing, blank or oversized prompts before any cache or provider work.
    pub fn validate<'a>(&self, prompt: Option<&'a str>) -> Result<&'a str> {
        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| GatewayError::Validation(PROMPT_REQUIRED.to_string()))?;

        let max = self.config.max_prompt_chars;
        if max > 0 && prompt.chars().count() > max {
            return Err(GatewayError::Validation(PROMPT_TOO_LONG.to_string()));
        }

        Ok(prompt)
    }

    /// Answer `prompt`, from cache when possible. The text is returned unmodified.
    pub async fn respond(&self, prompt: Option<&str>) -> Result<String> {
        let prompt = self.validate(prompt)?;
        let fingerprint = key_fingerprint(&normalize_key(prompt));
        let start = Instant::now();

        match self.cache.get_or_generate(prompt, self.generator.clone()).await {
            Ok(text) => {
                info!(
                    key = %fingerprint,
                    chars = text.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Prompt answered"
                );
                Ok(text)
            }
            Err(e) => {
                error!(
                    key = %fingerprint,
                    category = e.category(),
                    "Prompt failed: {}",
                    crate::utils::logging::sanitize(&e.to_string())
                );
                Err(e)
            }
        }
    }
}
