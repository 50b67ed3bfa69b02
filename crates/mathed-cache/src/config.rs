//! Redis cache configuration.

use std::env;
use std::time::Duration;

/// Redis cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_ENABLED`: Connect to Redis at startup (default: `false`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `CACHE_TTL_SECONDS`: Default TTL for cached items in seconds (default: `300`)
/// - `CACHE_PREFIX`: Prefix for all cache keys (default: `mathed`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Redis connection URL.
    pub redis_url: String,

    /// Default time-to-live for cached items in seconds.
    pub default_ttl_seconds: u64,

    /// Prefix for all cache keys to avoid collisions.
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("CACHE_ENABLED")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.enabled),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redis_url: "redis://127.0.0.1:6379".into(),
            default_ttl_seconds: 300,
            key_prefix: "mathed".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.key_prefix, "mathed");
    }
}
