//! Session cookies.
//!
//! `access_token` is sent on every path; `refresh_token` only to the refresh
//! endpoint. Both are `HttpOnly` and `SameSite=Lax`, `Secure` when configured.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mathed_config::cookie::{
    ACCESS_COOKIE_NAME, ACCESS_COOKIE_PATH, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH,
};
use mathed_config::{CookieConfig, JwtConfig};

/// A signed access/refresh pair ready to be set on the response.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

fn build_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age_seconds: i64,
    config: &CookieConfig,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds));

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

pub fn set_session_cookies(
    jar: CookieJar,
    tokens: SessionTokens,
    jwt_config: &JwtConfig,
    cookie_config: &CookieConfig,
) -> CookieJar {
    jar.add(build_cookie(
        ACCESS_COOKIE_NAME,
        tokens.access_token,
        ACCESS_COOKIE_PATH,
        jwt_config.access_token_expiry,
        cookie_config,
    ))
    .add(build_cookie(
        REFRESH_COOKIE_NAME,
        tokens.refresh_token,
        REFRESH_COOKIE_PATH,
        jwt_config.refresh_token_expiry,
        cookie_config,
    ))
}

/// Overwrites both cookies with expired, empty values.
///
/// Path and domain must match what was set or browsers keep the original.
pub fn clear_session_cookies(jar: CookieJar, cookie_config: &CookieConfig) -> CookieJar {
    let mut access = build_cookie(
        ACCESS_COOKIE_NAME,
        String::new(),
        ACCESS_COOKIE_PATH,
        0,
        cookie_config,
    );
    access.make_removal();

    let mut refresh = build_cookie(
        REFRESH_COOKIE_NAME,
        String::new(),
        REFRESH_COOKIE_PATH,
        0,
        cookie_config,
    );
    refresh.make_removal();

    jar.add(access).add(refresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test".into(),
            access_token_expiry: 1800,
            refresh_token_expiry: 604800,
            action_token_expiry: 259200,
        }
    }

    fn tokens() -> SessionTokens {
        SessionTokens {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = CookieConfig::default();
        let jar = set_session_cookies(CookieJar::new(), tokens(), &jwt_config(), &config);

        let access = jar.get(ACCESS_COOKIE_NAME).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.max_age(), Some(time::Duration::seconds(1800)));

        let refresh = jar.get(REFRESH_COOKIE_NAME).unwrap();
        assert_eq!(refresh.path(), Some(REFRESH_COOKIE_PATH));
        assert_eq!(refresh.max_age(), Some(time::Duration::seconds(604800)));
    }

    #[test]
    fn test_insecure_cookies_with_domain() {
        let config = CookieConfig {
            secure: false,
            domain: Some("mathed.ro".into()),
        };
        let jar = set_session_cookies(CookieJar::new(), tokens(), &jwt_config(), &config);
        let access = jar.get(ACCESS_COOKIE_NAME).unwrap();
        assert_eq!(access.secure(), Some(false));
        assert_eq!(access.domain(), Some("mathed.ro"));
    }

    #[test]
    fn test_clear_session_cookies() {
        let config = CookieConfig::default();
        let jar = clear_session_cookies(CookieJar::new(), &config);

        let access = jar.get(ACCESS_COOKIE_NAME).unwrap();
        assert_eq!(access.value(), "");
        assert_eq!(access.max_age(), Some(time::Duration::ZERO));

        let refresh = jar.get(REFRESH_COOKIE_NAME).unwrap();
        assert_eq!(refresh.path(), Some(REFRESH_COOKIE_PATH));
        assert_eq!(refresh.max_age(), Some(time::Duration::ZERO));
    }
}
