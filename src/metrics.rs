use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Reads `OBSERVABILITY_ENABLED` once; anything but `false`/`0` enables it.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router served on `METRICS_PORT`.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

pub fn track_registration(user_type: &str, requires_consent: bool) {
    if !is_observability_enabled() {
        return;
    }
    let consent = if requires_consent { "pending" } else { "none" };
    counter!("registrations_total", "user_type" => user_type.to_string(), "consent" => consent)
        .increment(1);
}

pub fn track_consent_approved() {
    if !is_observability_enabled() {
        return;
    }
    counter!("consent_approvals_total").increment(1);
}

pub fn track_login_success(user_type: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "user_type" => user_type.to_string(), "status" => "success")
        .increment(1);
}

/// `reason` is one of `invalid_credentials`, `inactive`, `consent_pending`.
pub fn track_login_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "user_type" => "unknown", "status" => "failure", "reason" => reason)
        .increment(1);
}

pub fn track_token_refresh(success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "rotated" } else { "rejected" };
    counter!("token_refreshes_total", "status" => status).increment(1);
}

pub fn track_password_reset(stage: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("password_resets_total", "stage" => stage).increment(1);
}

pub fn track_cache_lookup(resource: &'static str, hit: bool) {
    if !is_observability_enabled() {
        return;
    }
    let result = if hit { "hit" } else { "miss" };
    counter!("content_cache_lookups_total", "resource" => resource, "result" => result)
        .increment(1);
}
