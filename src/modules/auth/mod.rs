pub mod controller;
pub mod cookies;
pub mod model;
pub mod router;
pub mod service;
