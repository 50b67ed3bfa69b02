//! Database seeding.
//!
//! - [`curriculum`]: the Grade 5 ("Clasa a V-a") unit and lesson structure
//! - [`users`]: fake students and teachers for local development

pub mod curriculum;
pub mod models;
pub mod users;

pub use curriculum::{GRADE_5_CURRICULUM, placeholder_content, seed_grade5};
pub use models::{CurriculumSeedReport, DemoUsersConfig, TestSeed, UnitSeed, UserSeed};
pub use users::{clear_demo_users, seed_demo_users};
