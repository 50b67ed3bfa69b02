//! # MathEd CLI
//!
//! Administrative and seeding utilities for MathEd development and
//! deployment.
//!
//! ## Usage
//!
//! ```ignore
//! use mathed_cli::seeder::{seed_grade5, seed_demo_users, DemoUsersConfig};
//!
//! seed_grade5(&pool, false).await?;
//! seed_demo_users(&pool, DemoUsersConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;
