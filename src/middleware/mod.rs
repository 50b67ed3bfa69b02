//! Request extractors for cross-cutting concerns.
//!
//! # Authentication Flow
//!
//! 1. The client sends the `access_token` cookie set at login (or an
//!    `Authorization: Bearer <token>` header)
//! 2. [`auth::AuthUser`] validates the JWT and extracts its claims
//! 3. The handler runs with the caller's identity
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn me(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<_>, AppError> {
//!     let user_id = auth_user.user_id()?;
//!     // ...
//! }
//! ```

pub mod auth;
