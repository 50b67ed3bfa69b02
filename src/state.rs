use mathed_cache::{CacheConfig, RedisCache};
use mathed_config::{CookieConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig};
use mathed_db::{PgPool, init_db_pool};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cookie_config: CookieConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    /// `None` when caching is disabled or Redis was unreachable at startup.
    pub cache: Option<RedisCache>,
}

impl AppState {
    /// State with every config read from the environment, no cache and no
    /// rate limiting. Integration tests start from this.
    pub fn for_pool(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cookie_config: CookieConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::disabled(),
            cache: None,
        }
    }
}

pub async fn init_app_state() -> AppState {
    let cache_config = CacheConfig::from_env();
    let cache = if cache_config.enabled {
        match RedisCache::from_config(&cache_config).await {
            Ok(cache) => {
                info!(prefix = %cache_config.key_prefix, "Redis cache connected");
                Some(cache)
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, continuing without cache");
                None
            }
        }
    } else {
        None
    };

    AppState {
        db: init_db_pool().await,
        jwt_config: JwtConfig::from_env(),
        cookie_config: CookieConfig::from_env(),
        email_config: EmailConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        cache,
    }
}
