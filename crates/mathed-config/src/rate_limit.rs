//! Rate limiting configuration for API endpoints.
//!
//! Rate limits are enforced with the Governor crate's token bucket:
//!
//! - Tokens are added at the configured rate (per second)
//! - Each request consumes one token
//! - Burst size defines the maximum tokens that can accumulate
//! - Requests are rejected with `429 Too Many Requests` when the bucket is empty
//!
//! Buckets are keyed by client IP. [`SmartIpKeyExtractor`] reads
//! `X-Forwarded-For`, `X-Real-Ip` and `Forwarded` before falling back to the
//! peer address, so the API can sit behind a reverse proxy.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: Turn limiting on or off (default: `true`)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: Replenish interval for general endpoints (default: 2)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: Burst size for general endpoints (default: 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Replenish interval for auth endpoints (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Burst size for auth endpoints (default: 5)
//!
//! # Example
//!
//! ```ignore
//! use mathed_config::RateLimitConfig;
//! use tower_governor::GovernorLayer;
//!
//! let config = RateLimitConfig::from_env();
//! let auth_router = Router::new()
//!     .route("/login/", post(login))
//!     .layer(GovernorLayer::new(config.auth_governor_config()));
//! ```

use ::governor::middleware::NoOpMiddleware;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

/// Rate limit configuration for the API.
///
/// Authentication endpoints (login, registration, password reset) get a
/// stricter bucket than the curriculum read endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Whether any limiter layer is installed.
    pub enabled: bool,

    /// Seconds between token replenishments for general endpoints.
    pub general_per_second: u64,

    /// Burst size for general endpoints.
    pub general_burst_size: u32,

    /// Seconds between token replenishments for auth endpoints.
    pub auth_per_second: u64,

    /// Burst size for auth endpoints.
    ///
    /// Keeps brute-force attempts against login and password reset slow.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: crate::env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            general_per_second: std::env::var("RATE_LIMIT_GENERAL_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.general_per_second),
            general_burst_size: std::env::var("RATE_LIMIT_GENERAL_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.general_burst_size),
            auth_per_second: std::env::var("RATE_LIMIT_AUTH_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_per_second),
            auth_burst_size: std::env::var("RATE_LIMIT_AUTH_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_burst_size),
        }
    }

    /// A configuration that installs no limiter at all.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a `GovernorConfig` for general API endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the period or burst size is zero.
    #[must_use]
    pub fn general_governor_config(&self) -> GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware> {
        GovernorConfigBuilder::default()
            .per_second(self.general_per_second)
            .burst_size(self.general_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build general rate limiter config")
    }

    /// Creates a `GovernorConfig` for authentication endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the period or burst size is zero.
    #[must_use]
    pub fn auth_governor_config(&self) -> GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build auth rate limiter config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_per_second, 2);
        assert_eq!(config.general_burst_size, 30);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_governor_configs_build() {
        let config = RateLimitConfig::default();
        let _ = config.general_governor_config();
        let _ = config.auth_governor_config();
    }
}
