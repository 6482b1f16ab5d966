use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::health))
        .route("/api/groups", get(handlers::get_groups))
        .route("/api/report", get(handlers::get_report))
        .with_state(state)
}
