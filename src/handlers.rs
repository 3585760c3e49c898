use crate::errors::{AppError, LoadError};
use crate::models::{DashboardQuery, DashboardResponse, PerformanceRecord};
use crate::source::load_records;
use crate::state::AppState;
use crate::stats::build_dashboard;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use tracing::error;

/// The page always renders; a failed load shows an error banner over the
/// empty placeholder.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let query = DashboardQuery::from_pairs(&params)?;

    let html = match load_records(&state).await {
        Ok(records) => {
            let dashboard = build_dashboard(&records, query.granularity, &query.metrics);
            render_index(&query, &dashboard, None)
        }
        Err(err) => {
            error!("failed to load sheet: {err}");
            let dashboard = build_dashboard(&[], query.granularity, &query.metrics);
            let message = err.to_string();
            render_index(&query, &dashboard, Some(message.as_str()))
        }
    };

    Ok(Html(html))
}

pub async fn get_records(State(state): State<AppState>) -> Result<Json<Vec<PerformanceRecord>>, AppError> {
    let records = load_records(&state).await.inspect_err(log_load_error)?;
    Ok(Json(Vec::clone(&records)))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<DashboardResponse>, AppError> {
    let query = DashboardQuery::from_pairs(&params)?;
    let records = load_records(&state).await.inspect_err(log_load_error)?;
    Ok(Json(build_dashboard(&records, query.granularity, &query.metrics)))
}

pub async fn health() -> &'static str {
    "ok"
}

fn log_load_error(err: &LoadError) {
    error!("failed to load sheet: {err}");
}
