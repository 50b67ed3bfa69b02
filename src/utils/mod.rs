//! Shared utilities.
//!
//! - [`email`]: transactional email (consent requests, password resets) over SMTP

pub mod email;
