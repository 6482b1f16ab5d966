use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{Group, SearchResponse};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

/// Length of the trailing window the report covers.
pub const WINDOW_DAYS: i64 = 7;
/// Only one page of search results is requested.
pub const PAGE_LIMIT: u32 = 200;

/// Thin REST client for the Hypothesis API.
#[derive(Debug, Clone)]
pub struct HypothesisClient {
    http: reqwest::Client,
    base_url: String,
}

impl HypothesisClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("annotation_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    pub async fn fetch_groups(&self, token: &str) -> Result<Vec<Group>, FetchError> {
        let response = self
            .http
            .get(format!("{}/profile/groups", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let groups: Vec<Group> = check_status(response)?
            .json()
            .await
            .map_err(FetchError::Decode)?;
        debug!(groups = groups.len(), "fetched groups");
        Ok(groups)
    }

    /// Annotations in `group` created during the week ending at `window_end`.
    pub async fn fetch_annotations(
        &self,
        token: &str,
        group: &str,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Value>, FetchError> {
        let (start, end) = search_window(window_end);
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .bearer_auth(token)
            .query(&search_params(group, start, end))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let body: SearchResponse = check_status(response)?
            .json()
            .await
            .map_err(FetchError::Decode)?;
        info!(group, rows = body.rows.len(), "fetched annotations");
        Ok(body.rows)
    }
}

pub fn search_window(window_end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (window_end - Duration::days(WINDOW_DAYS), window_end)
}

pub fn search_params(
    group: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    vec![
        ("group", group.to_string()),
        ("sort", "updated".to_string()),
        ("search_after", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("search_before", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("limit", PAGE_LIMIT.to_string()),
    ]
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized),
        status => Err(FetchError::Status(status.as_u16())),
    }
}
