//! API route handlers - maps HTTP endpoints to GitHub fetches and summaries.
//!
//! Each submodule defines routes for a feature area:
//! - `summary`: Commit statistics and AI narrative (GET /api/summary)
//! - `activity`: The signed-in user's own commits (GET /api/my-activity)
//! - `repos`: Accessible repositories (GET /api/repos)
//! - `installations`: GitHub App installations and the App callback
//! - `health`: Liveness (GET /api/health)

pub mod activity;
pub mod health;
pub mod installations;
pub mod repos;
pub mod summary;

use axum::Router;
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::{AppError, Result};
use crate::github::repositories::CommitQuery;
use crate::github::{AuthMethod, GitHubClient};
use crate::models::DateRange;
use crate::session::Session;
use crate::state::{AppState, SharedState};

/// Window used when the request names no `since`.
const DEFAULT_WINDOW_DAYS: i64 = 30;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .merge(summary::routes(state.clone()))
        .merge(activity::routes(state.clone()))
        .merge(repos::routes(state.clone()))
        .merge(installations::routes(state.clone()))
        .merge(health::routes(state))
}

/// Resolve the request's credentials into an authenticated client.
pub(crate) async fn authenticate(
    state: &AppState,
    session: &Session,
    installation_query: Option<&str>,
) -> Result<(AuthMethod, GitHubClient)> {
    let installation = session.installation(installation_query)?;
    let method = session.auth_method(&installation)?;
    let client = state.auth.authenticate(&method).await?;
    tracing::debug!(method = ?method, source = %installation.source, "Authenticated request");
    Ok((method, client))
}

/// Inclusive day window from `since`/`until` query values (`YYYY-MM-DD` or
/// RFC 3339). Defaults to the last `DEFAULT_WINDOW_DAYS` days.
pub(crate) fn parse_date_range(since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
    let until = match non_empty(until) {
        Some(raw) => parse_day("until", raw)?,
        None => Utc::now().date_naive(),
    };
    let since = match non_empty(since) {
        Some(raw) => parse_day("since", raw)?,
        None => until
            .checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
            .ok_or_else(|| AppError::InvalidRequest(format!("until ({until}) is out of range")))?,
    };

    if since > until {
        return Err(AppError::InvalidRequest(format!(
            "since ({since}) must not be after until ({until})"
        )));
    }

    Ok(DateRange { since, until })
}

pub(crate) fn commit_query(range: &DateRange, author: Option<String>) -> Result<CommitQuery> {
    let until = end_of_day(range.until)
        .ok_or_else(|| AppError::InvalidRequest(format!("until ({}) is out of range", range.until)))?;

    Ok(CommitQuery {
        since: start_of_day(range.since),
        until,
        author,
    })
}

/// Comma-separated list parameter; `None` when absent or empty.
pub(crate) fn parse_list(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

pub(crate) fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_day(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {field} date: {raw}")))
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Last second of `day`; `None` on the final representable day.
fn end_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.checked_add_days(Days::new(1))?
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_sub_signed(Duration::seconds(1))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    pub async fn get(router: Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }
}
