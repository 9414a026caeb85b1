//! Configuration data structures for the folio gateway.
//!
//! This module defines the schema for the application settings, including
//! server parameters, the Gemini credential and generation settings, and the
//! response cache policy.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, CORS).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Response cache policy.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Prompt validation settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Performance and resource management settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Settings for the upstream Gemini API connection.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`. Absent or blank means unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the Generative Language API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used for every generation.
    /// Default: `gemini-2.0-flash`
    #[serde(default = "default_model")]
    pub model: String,

    /// Whole-request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Default: `0.7`
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default: `2048`
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Response cache policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of an entry from creation.
    /// Default: `300`
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Upper bound on live entries, least recently used evicted first. `0` disables the bound.
    /// Default: `1000`
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Interval of the background expiry sweep. `0` disables the sweeper.
    /// Default: `60`
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Share one in-flight generation between concurrent callers of the same prompt.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub coalesce_inflight: bool,
}

/// Prompt validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Maximum prompt length in characters. `0` disables the check.
    /// Default: `4000`
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Settings for tuning application performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of idle connections per host in the HTTP pool.
    /// Default: `10`
    #[serde(default = "default_pool_size")]
    pub connection_pool_size: usize,

    /// Whether to enable gzip compression for HTTP responses.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enable_compression: bool,

    /// Maximum accepted request body.
    /// Default: `65536`
    #[serde(default = "default_body_limit")]
    pub request_body_limit_bytes: usize,
}

impl GeminiConfig {
    /// The configured key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// Manual Debug so the key never reaches a log line
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_entries: default_max_entries(),
            sweep_interval_seconds: default_sweep_interval(),
            coalesce_inflight: true,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            connection_pool_size: default_pool_size(),
            enable_compression: true,
            request_body_limit_bytes: default_body_limit(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_ttl() -> u64 {
    300 // 5 minutes
}

fn default_max_entries() -> usize {
    1000
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_max_prompt_chars() -> usize {
    4000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_body_limit() -> usize {
    64 * 1024
}
