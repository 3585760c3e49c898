use crate::errors::LoadError;
use crate::models::PerformanceRecord;
use crate::normalize::parse_csv;
use crate::state::AppState;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn fetch_csv(client: &Client, url: &str) -> Result<String, LoadError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(%status, "sheet export request failed");
        return Err(LoadError::Status(status));
    }
    Ok(response.text().await?)
}

/// Normalized daily records for the configured sheet, served from the cache
/// while fresh.
pub async fn load_records(state: &AppState) -> Result<Arc<Vec<PerformanceRecord>>, LoadError> {
    let url = state.sheet_url.as_str();
    state
        .cache
        .get_or_try_insert_with(url, move || async move {
            info!("fetching sheet {url}");
            let text = fetch_csv(&state.client, url).await?;
            let records = parse_csv(&text)?;
            info!(rows = records.len(), "loaded sheet");
            Ok::<_, LoadError>(Arc::new(records))
        })
        .await
}
