use crate::config::Config;
use crate::hypothesis::HypothesisClient;
use std::sync::Arc;

/// Shared, read-only state. Per-user choices (credential, group) arrive with
/// each request instead of living here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: HypothesisClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = HypothesisClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}
