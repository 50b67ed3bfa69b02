//! Session cookie attributes.
//!
//! Both session cookies are `HttpOnly` and `SameSite=Lax`. The refresh cookie
//! is only ever sent back to the refresh endpoint.
//!
//! # Environment Variables
//!
//! - `COOKIE_SECURE`: Mark cookies `Secure` (default: `true`; set `false` for plain-HTTP development)
//! - `COOKIE_DOMAIN`: Optional `Domain` attribute

use std::env;

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const ACCESS_COOKIE_PATH: &str = "/";
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/token/refresh/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieConfig {
    pub secure: bool,
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            domain: None,
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Self {
        Self {
            secure: crate::env_flag("COOKIE_SECURE", true),
            domain: env::var("COOKIE_DOMAIN")
                .ok()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}
