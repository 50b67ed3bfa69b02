//! # MathEd Core
//!
//! Core types, errors, and utilities for the MathEd API.
//!
//! This crate provides foundational types used throughout the MathEd application:
//!
//! - [`errors`]: Application error type with HTTP response conversion and
//!   field-scoped validation errors
//! - [`password`]: Password hashing, verification and the password policy
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use mathed_core::errors::{AppError, FieldErrorsBuilder};
//! use mathed_core::password::{hash_password, verify_password};
//!
//! // Create an error
//! let error = AppError::not_found(anyhow::anyhow!("Lesson not found."));
//!
//! // Collect field errors
//! let mut errors = FieldErrorsBuilder::new();
//! errors.add("password_confirm", "Passwords do not match.");
//! errors.finish()?;
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse, FieldErrors, FieldErrorsBuilder};
pub use password::{hash_password, password_policy_violations, verify_password};
