use crate::domain::error::LivmapError;
use crate::infrastructure::config::Config;
use crate::infrastructure::storage::cache::GeocodeCache;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<GeocodeCache>,
    pub config: Config,
    pub http_client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, LivmapError> {
        let http_client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .user_agent("livmap/0.1.0")
            .build()?;

        Ok(Self {
            cache: Arc::new(GeocodeCache::new()),
            config,
            http_client,
        })
    }
}
