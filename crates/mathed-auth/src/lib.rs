//! # MathEd Auth
//!
//! Authentication types and signed-token utilities for the MathEd API.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structures for access and refresh tokens
//! - [`jwt`]: Session token creation and verification
//! - [`action_token`]: Single-purpose links (parental consent, password reset)
//!   bound to the account's current credential state
//!
//! # Token Types
//!
//! - **Access Token** ([`Claims`]): 30-minute token carried in the `access_token` cookie
//! - **Refresh Token** ([`RefreshTokenClaims`]): 7-day token with a unique `jti`,
//!   rotated on every use
//! - **Action Token** ([`ActionTokenClaims`]): emailed link token, invalidated
//!   as soon as the account's password, email or last login changes
//!
//! # Example
//!
//! ```ignore
//! use mathed_auth::{create_access_token, verify_token};
//! use mathed_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//!
//! let token = create_access_token(user_id, "elev@example.com", "student", &config)?;
//! let claims = verify_token(&token, &config)?;
//! println!("User ID: {}", claims.sub);
//! ```

pub mod action_token;
pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use action_token::{
    AccountState, ActionPurpose, ActionTokenClaims, create_action_token, decode_uid, encode_uid,
    verify_action_token,
};
pub use claims::{Claims, RefreshTokenClaims, TokenKind};
pub use jwt::{
    IssuedRefreshToken, create_access_token, create_refresh_token, verify_refresh_token,
    verify_token,
};
