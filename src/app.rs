use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/records", get(handlers::get_records))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/healthz", get(handlers::health))
        .with_state(state)
}
