//! Redis cache client.
//!
//! Values are stored as JSON under `{prefix}:{key}`. Read failures are
//! logged and reported as misses so callers fall through to the database.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::CacheConfig;

/// Redis cache client backed by a reconnecting connection manager.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
    prefix: String,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("default_ttl", &self.default_ttl)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn new(
        redis_url: &str,
        default_ttl: Duration,
        prefix: impl Into<String>,
    ) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            default_ttl,
            prefix: prefix.into(),
        })
    }

    pub async fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(&config.redis_url, config.default_ttl(), &config.key_prefix).await
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Gets a cached value by key.
    ///
    /// Returns `None` if the key doesn't exist, Redis fails, or the stored
    /// JSON no longer matches `T`.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.conn.clone();
        let full_key = self.full_key(key);

        match conn.get::<_, Option<String>>(&full_key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %full_key, "Cache hit");
                match serde_json::from_str(&value) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        error!(cache.key = %full_key, error = %e, "Failed to deserialize cached value");
                        None
                    }
                }
            }
            Ok(None) => {
                debug!(cache.key = %full_key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %full_key, error = %e, "Redis GET error");
                None
            }
        }
    }

    /// Sets a cached value with the default TTL.
    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let full_key = self.full_key(key);
        let json = serde_json::to_string(value)?;
        let ttl = self.default_ttl.as_secs();

        conn.set_ex::<_, _, ()>(&full_key, json, ttl).await?;

        debug!(cache.key = %full_key, cache.ttl_secs = %ttl, "Cache set");

        Ok(())
    }

    /// Deletes every key matching `pattern` (relative to the prefix).
    ///
    /// Uses incremental `SCAN` rather than `KEYS`.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let full_pattern = self.full_key(pattern);
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&full_pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %full_pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CachedGrade {
        number: i16,
        name: String,
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_and_invalidate() {
        let cache = RedisCache::new("redis://localhost:6379", Duration::from_secs(60), "mathed-test")
            .await
            .unwrap();

        let grade = CachedGrade {
            number: 5,
            name: "Clasa a V-a".to_string(),
        };

        cache.set("content:grade:5", &grade).await.unwrap();
        let retrieved: Option<CachedGrade> = cache.get("content:grade:5").await;
        assert_eq!(retrieved, Some(grade));

        let deleted = cache.invalidate_pattern("content:*").await.unwrap();
        assert!(deleted >= 1);
        assert!(cache.get::<CachedGrade>("content:grade:5").await.is_none());
    }
}
