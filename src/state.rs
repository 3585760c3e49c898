use crate::cache::TtlCache;
use crate::config::Settings;
use crate::models::PerformanceRecord;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sheet_url: String,
    pub client: Client,
    pub cache: Arc<TtlCache<Arc<Vec<PerformanceRecord>>>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.fetch_timeout).build()?;
        Ok(Self {
            sheet_url: settings.sheet_url.clone(),
            client,
            cache: Arc::new(TtlCache::new(settings.cache_ttl)),
        })
    }
}
