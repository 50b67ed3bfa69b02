//! Cache keys for the curriculum read API.
//!
//! Keys are relative; [`RedisCache`] adds the configured prefix.

use crate::RedisCache;
use tracing::{info, warn};

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Keys for published curriculum projections.
pub mod content {
    use super::*;

    pub fn grades() -> String {
        build_key(&["content", "grades"])
    }

    /// Grade detail, keyed by grade number rather than id.
    pub fn grade(number: i16) -> String {
        build_key(&["content", "grade", &number.to_string()])
    }

    pub fn unit(unit_id: i64) -> String {
        build_key(&["content", "unit", &unit_id.to_string()])
    }

    pub fn lesson(lesson_id: i64) -> String {
        build_key(&["content", "lesson", &lesson_id.to_string()])
    }

    pub fn glossary(filters_hash: &str) -> String {
        build_key(&["content", "glossary", filters_hash])
    }

    pub fn invalidation_pattern() -> String {
        "content:*".to_string()
    }
}

/// Short, stable hash of query parameters for use in a key.
///
/// FNV-1a over the `Hash` output, so keys stay identical across process
/// restarts and across replicas.
pub fn hash_filters<T: std::hash::Hash>(filters: &T) -> String {
    use std::hash::Hasher;

    struct Fnv(u64);
    impl Hasher for Fnv {
        fn finish(&self) -> u64 {
            self.0
        }
        fn write(&mut self, bytes: &[u8]) {
            for b in bytes {
                self.0 ^= u64::from(*b);
                self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
            }
        }
    }

    let mut hasher = Fnv(0xcbf2_9ce4_8422_2325);
    filters.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

pub mod invalidate {
    use super::*;

    /// Drops every cached curriculum projection.
    ///
    /// Call after changing curriculum rows (e.g. after seeding).
    pub async fn content(cache: Option<&RedisCache>) {
        let Some(cache) = cache else { return };

        match cache
            .invalidate_pattern(&content::invalidation_pattern())
            .await
        {
            Ok(deleted) => info!(cache.deleted = %deleted, "Content cache invalidated"),
            Err(e) => warn!(error = %e, "Failed to invalidate content cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_keys() {
        assert_eq!(content::grades(), "content:grades");
        assert_eq!(content::grade(5), "content:grade:5");
        assert_eq!(content::unit(12), "content:unit:12");
        assert_eq!(content::lesson(7), "content:lesson:7");
        assert!(content::glossary("abc").starts_with("content:glossary:"));
    }

    #[test]
    fn test_all_keys_match_invalidation_pattern() {
        let prefix = content::invalidation_pattern();
        let prefix = prefix.trim_end_matches('*');
        for key in [content::grades(), content::grade(6), content::lesson(1)] {
            assert!(key.starts_with(prefix));
        }
    }

    #[test]
    fn test_hash_filters_consistency() {
        let filters = (Some(3i64), Some("frac".to_string()));
        assert_eq!(hash_filters(&filters), hash_filters(&filters));
        assert_ne!(
            hash_filters(&filters),
            hash_filters(&(Some(4i64), Some("frac".to_string())))
        );
    }
}
