//! JWT claim structures for session tokens.
//!
//! - [`Claims`]: Access token claims
//! - [`RefreshTokenClaims`]: Refresh token claims, identified by `jti` in the revocation store

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Distinguishes access from refresh tokens so neither can stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims for access tokens.
///
/// # Fields
///
/// - `sub`: User ID (subject)
/// - `email`: User's email address
/// - `user_type`: Role tag (`student`, `teacher` or `admin`)
/// - `token_type`: Always [`TokenKind::Access`]
/// - `exp`: Token expiration timestamp
/// - `iat`: Token issued-at timestamp
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    /// Role tag of the account
    pub user_type: String,
    pub token_type: TokenKind,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

/// JWT claims for refresh tokens.
///
/// Refresh tokens are single-use: the `jti` is marked revoked the moment the
/// token is exchanged for a new pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    pub user_type: String,
    pub token_type: TokenKind,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    /// Unique token identifier (JWT ID), primary key of the revocation store
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            email: "elev@example.com".to_string(),
            user_type: "student".to_string(),
            token_type: TokenKind::Access,
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""user_type":"student""#));
        assert!(serialized.contains(r#""token_type":"access""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","email":"prof@test.com","user_type":"teacher","token_type":"access","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert_eq!(claims.user_type, "teacher");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_refresh_token_claims_serialize() {
        let claims = RefreshTokenClaims {
            sub: "user-123".to_string(),
            email: "refresh@test.com".to_string(),
            user_type: "student".to_string(),
            token_type: TokenKind::Refresh,
            exp: 1234567890,
            iat: 1234567800,
            jti: "test-jti-123".to_string(),
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""jti":"test-jti-123""#));
        assert!(serialized.contains(r#""token_type":"refresh""#));
    }
}
