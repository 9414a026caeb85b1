// Response cache module
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use crate::config::CacheConfig;
pub use manager::{key_fingerprint, normalize_key, ResponseCache};
pub use models::{CacheEntry, CacheStats};
