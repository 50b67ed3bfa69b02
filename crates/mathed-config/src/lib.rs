//! # MathEd Config
//!
//! Configuration types for the MathEd API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Token signing secret and lifetimes
//! - [`cookie`]: Attributes of the session cookies
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: Email/SMTP configuration
//! - [`rate_limit`]: API rate limiting configuration
//!
//! # Example
//!
//! ```ignore
//! use mathed_config::{CookieConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig};
//!
//! // Load all configs from environment
//! let jwt_config = JwtConfig::from_env();
//! let cookie_config = CookieConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod cookie;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;

pub(crate) fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v == "true" || v == "1" || v == "yes"
        })
        .unwrap_or(default)
}

// Re-export commonly used types at crate root
pub use cookie::CookieConfig;
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
