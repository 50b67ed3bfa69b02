use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use mathed_cache::{CacheControlConfig, cache_control, etag_middleware};

use super::controller::{get_grade, get_lesson, get_unit, list_grades, search_glossary};

pub fn init_content_router() -> Router<AppState> {
    Router::new()
        .route("/grades/", get(list_grades))
        .route("/grades/{number}/", get(get_grade))
        .route("/units/{id}/", get(get_unit))
        .route("/lessons/{id}/", get(get_lesson))
        .route("/glossary/", get(search_glossary))
        .route_layer(middleware::from_fn(etag_middleware))
        .route_layer(cache_control(CacheControlConfig::private(60)))
}
