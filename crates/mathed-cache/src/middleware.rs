//! HTTP caching middleware.
//!
//! - `Cache-Control` for the curriculum responses
//! - `ETag` / `If-None-Match` conditional GETs
//!
//! # Example
//!
//! ```ignore
//! use mathed_cache::{CacheControlConfig, cache_control, etag_middleware};
//!
//! let content = Router::new()
//!     .route("/grades/", get(list_grades))
//!     .layer(axum::middleware::from_fn(etag_middleware))
//!     .layer(cache_control(CacheControlConfig::private(60)));
//! ```

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderValue, Method, StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControlConfig {
    pub max_age: u64,
    pub no_store: bool,
}

impl CacheControlConfig {
    /// Browser-only caching. Used for anything behind authentication.
    pub fn private(max_age: u64) -> Self {
        Self {
            max_age,
            no_store: false,
        }
    }

    pub fn no_store() -> Self {
        Self {
            max_age: 0,
            no_store: true,
        }
    }

    pub fn to_header_value(&self) -> HeaderValue {
        if self.no_store {
            return HeaderValue::from_static("no-store");
        }

        HeaderValue::from_str(&format!("private, max-age={}", self.max_age))
            .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    }
}

/// Sets `Cache-Control` on responses that don't already carry one.
///
/// Error responses get `no-store` so a transient 404 or 500 is never reused.
pub fn cache_control(
    config: CacheControlConfig,
) -> SetResponseHeaderLayer<impl Fn(&Response) -> Option<HeaderValue> + Clone> {
    let success = config.to_header_value();
    let failure = CacheControlConfig::no_store().to_header_value();

    SetResponseHeaderLayer::if_not_present(CACHE_CONTROL, move |response: &Response| {
        if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
            Some(success.clone())
        } else {
            Some(failure.clone())
        }
    })
}

/// Strong ETag: the first 16 bytes of the body's SHA-256, hex-encoded and quoted.
fn generate_etag(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("\"{}\"", hex::encode(&hash[..16]))
}

/// Weak comparison (ignores the `W/` prefix) as `If-None-Match` requires.
///
/// `if_none_match` may list several tags separated by commas.
fn etags_match(if_none_match: &str, server_etag: &str) -> bool {
    let server = server_etag.trim().trim_start_matches("W/");
    if_none_match.split(',').any(|tag| {
        let client = tag.trim().trim_start_matches("W/");
        client == "*" || client == server
    })
}

/// Adds an ETag to successful GET responses and answers `304 Not Modified`
/// when the client already holds the current representation.
///
/// The response body is buffered to hash it; curriculum payloads are small.
pub async fn etag_middleware(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let if_none_match = request
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(request).await;

    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let etag = generate_etag(&bytes);
    let Ok(etag_value) = HeaderValue::from_str(&etag) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    parts.headers.insert(ETAG, etag_value.clone());

    let not_modified = if_none_match
        .as_deref()
        .is_some_and(|header| etags_match(header, &etag));

    if not_modified {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        response.headers_mut().insert(ETAG, etag_value);
        if let Some(cache_control) = parts.headers.get(CACHE_CONTROL) {
            response
                .headers_mut()
                .insert(CACHE_CONTROL, cache_control.clone());
        }
        return response;
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/grades/", get(|| async { "[{\"number\":5}]" }))
            .route(
                "/missing/",
                get(|| async { (StatusCode::NOT_FOUND, "Grade not found.") }),
            )
            .layer(axum::middleware::from_fn(etag_middleware))
            .layer(cache_control(CacheControlConfig::private(60)))
    }

    #[test]
    fn test_cache_control_values() {
        assert_eq!(
            CacheControlConfig::private(60).to_header_value(),
            "private, max-age=60"
        );
        assert_eq!(CacheControlConfig::no_store().to_header_value(), "no-store");
    }

    #[test]
    fn test_etag_generation() {
        let etag = generate_etag(b"lesson body");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 34);
        assert_eq!(etag, generate_etag(b"lesson body"));
    }

    #[test]
    fn test_etags_match() {
        assert!(etags_match("\"abc123\"", "\"abc123\""));
        assert!(etags_match("W/\"abc123\"", "\"abc123\""));
        assert!(etags_match("*", "\"abc123\""));
        assert!(!etags_match("\"abc123\"", "\"xyz789\""));
    }

    #[test]
    fn test_etags_match_tag_list() {
        assert!(etags_match("\"old\", W/\"abc123\"", "\"abc123\""));
        assert!(etags_match("\"old\",\"abc123\"", "\"abc123\""));
        assert!(!etags_match("\"old\", \"older\"", "\"abc123\""));
    }

    #[tokio::test]
    async fn test_conditional_get_with_tag_list() {
        let first = app()
            .oneshot(Request::get("/grades/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let etag = first.headers()[ETAG].to_str().unwrap().to_string();

        let second = app()
            .oneshot(
                Request::get("/grades/")
                    .header(IF_NONE_MATCH, format!("\"stale\", {etag}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_conditional_get_returns_304() {
        let first = app()
            .oneshot(Request::get("/grades/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_CONTROL], "private, max-age=60");
        let etag = first.headers()[ETAG].clone();

        let second = app()
            .oneshot(
                Request::get("/grades/")
                    .header(IF_NONE_MATCH, etag.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers()[ETAG], etag);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let response = app()
            .oneshot(Request::get("/missing/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(ETAG).is_none());
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }
}
