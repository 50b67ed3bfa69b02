use std::sync::Arc;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::router::init_auth_router;
use crate::modules::content::router::init_content_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::IF_NONE_MATCH,
        ])
        .expose_headers([axum::http::header::ETAG])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let rate_limit = &state.rate_limit_config;

    let mut auth_router = init_auth_router();
    if rate_limit.enabled {
        auth_router = auth_router.layer(GovernorLayer::new(Arc::new(
            rate_limit.auth_governor_config(),
        )));
    }

    let mut api = Router::new()
        .nest("/auth", auth_router.merge(init_users_router()))
        .nest("/content", init_content_router());
    if rate_limit.enabled {
        api = api.layer(GovernorLayer::new(Arc::new(
            rate_limit.general_governor_config(),
        )));
    }

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(logging_middleware))
}
