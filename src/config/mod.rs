// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Conventional variable name for the Gemini credential, honoured when the
/// prefixed `FOLIO__GEMINI__API_KEY` is not set.
pub const FALLBACK_API_KEY_VAR: &str = "GEMINI_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::from(file).required(path.is_some()))
            // Override with environment variables (e.g. FOLIO__SERVER__PORT)
            .add_source(
                Environment::with_prefix("FOLIO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        app_config.apply_fallback_key(std::env::var(FALLBACK_API_KEY_VAR).ok());
        Ok(app_config)
    }

    /// Use `key` as the credential when none was configured.
    pub fn apply_fallback_key(&mut self, key: Option<String>) {
        if self.gemini.api_key().is_none() {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                self.gemini.api_key = Some(key);
            }
        }
    }

    /// Startup checks. Problems are returned as warnings; the service still
    /// starts and reports a configuration error per request where relevant.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.gemini.api_key().is_none() {
            warnings.push(format!(
                "Gemini API key is not set (FOLIO__GEMINI__API_KEY or {}); \
                 prompt requests will fail with a configuration error",
                FALLBACK_API_KEY_VAR
            ));
        }
        if self.cache.ttl_seconds == 0 {
            warnings.push("cache.ttl_seconds is 0; responses will never be served from cache".to_string());
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            warnings.push(format!(
                "gemini.temperature {} is outside the provider range 0.0..=2.0",
                self.gemini.temperature
            ));
        }
        if self.gemini.timeout_seconds == 0 {
            warnings.push("gemini.timeout_seconds is 0; provider calls will time out immediately".to_string());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json" | "compact") {
            warnings.push(format!(
                "unknown logging.format '{}', falling back to pretty",
                self.logging.format
            ));
        }

        warnings
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".folio-gateway")
            .join("config.toml")
    }
}
