use crate::errors::AppError;
use crate::hypothesis::{search_window, WINDOW_DAYS};
use crate::models::{Group, Report, ReportQuery, ReportResponse};
use crate::state::AppState;
use crate::stats::build_report;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Html,
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(WINDOW_DAYS, state.config.api_token.is_some()))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Group>>, AppError> {
    let token = credential(&headers, &state)?;
    let groups = state.client.fetch_groups(&token).await.inspect_err(|err| {
        warn!("failed to fetch groups: {err}");
    })?;
    Ok(Json(groups))
}

pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    let group = query
        .group
        .as_deref()
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .ok_or_else(|| AppError::bad_request("group is required"))?
        .to_string();
    let token = credential(&headers, &state)?;

    Ok(Json(weekly_report(&state, &token, group, Utc::now()).await))
}

/// Fetches one week of annotations and aggregates them. A failed fetch is
/// reported alongside empty tables.
async fn weekly_report(
    state: &AppState,
    token: &str,
    group: String,
    window_end: DateTime<Utc>,
) -> ReportResponse {
    let (start, end) = search_window(window_end);
    let (report, fetch_error) = match state
        .client
        .fetch_annotations(token, &group, window_end)
        .await
    {
        Ok(rows) => (build_report(&rows), None),
        Err(err) => {
            warn!(group = %group, "failed to fetch annotations: {err}");
            (Report::default(), Some(err.to_string()))
        }
    };

    info!(
        group = %group,
        records = report.total_records,
        skipped = report.skipped,
        students = report.counts.len(),
        "report ready"
    );

    ReportResponse {
        group,
        window_start: start.to_rfc3339_opts(SecondsFormat::Secs, true),
        window_end: end.to_rfc3339_opts(SecondsFormat::Secs, true),
        fetch_error,
        report,
    }
}

/// Bearer credential from the request, else the server's configured one.
fn credential(headers: &HeaderMap, state: &AppState) -> Result<String, AppError> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    from_header
        .or(state.config.api_token.as_deref())
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized("enter your Hypothesis API key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::{HeaderValue, StatusCode};

    fn state_with_token(token: Option<&str>) -> AppState {
        let mut config = Config::from_lookup(|_| None);
        config.api_token = token.map(str::to_string);
        AppState::new(config).expect("client")
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn credential_prefers_request_header() {
        let state = state_with_token(Some("server"));
        let token = credential(&bearer("Bearer  personal "), &state).unwrap();
        assert_eq!(token, "personal");
    }

    #[test]
    fn credential_falls_back_to_server_token() {
        let state = state_with_token(Some("server"));
        assert_eq!(credential(&HeaderMap::new(), &state).unwrap(), "server");
        assert_eq!(credential(&bearer("Bearer "), &state).unwrap(), "server");
    }

    #[test]
    fn credential_missing_is_unauthorized() {
        let state = state_with_token(None);
        let err = credential(&bearer("Basic abc"), &state).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
