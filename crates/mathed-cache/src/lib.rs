//! # MathEd Cache
//!
//! Redis-based caching utilities for the MathEd API.
//!
//! This crate provides:
//! - Redis connection management and JSON cache-aside operations
//! - Cache configuration from environment variables
//! - HTTP caching middleware (ETag, Cache-Control)
//! - Cache keys for the curriculum read API
//!
//! Caching is optional. When `CACHE_ENABLED` is off or Redis is unreachable
//! at startup, services receive `None` and read straight from PostgreSQL.
//!
//! # Example
//!
//! ```ignore
//! use mathed_cache::{CacheConfig, RedisCache, keys};
//!
//! let config = CacheConfig::from_env();
//! let cache = RedisCache::new(&config.redis_url, config.default_ttl()).await?;
//!
//! cache.set(&keys::content::grade(5), &grade).await?;
//! let cached: Option<GradeDetail> = cache.get(&keys::content::grade(5)).await;
//! ```

pub mod config;
pub mod keys;
pub mod middleware;
pub mod redis;

pub use config::CacheConfig;
pub use keys::{hash_filters, invalidate};
pub use middleware::{CacheControlConfig, cache_control, etag_middleware};
pub use redis::{CacheError, RedisCache};
