//! Account lookup and the `/auth/me/` profile endpoint.

pub mod controller;
pub mod router;
pub mod service;
