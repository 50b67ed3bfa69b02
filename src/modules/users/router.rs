use crate::modules::users::controller::get_me;
use crate::state::AppState;
use axum::{Router, routing::get};

/// Mounted under `/auth` next to the session endpoints.
pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/me/", get(get_me))
}
