//! Commit summary endpoint.
//!
//! GET /api/summary?since=&until=&repositories=&author=&installation_id=&ai=&include_commits=
//!
//! Fetches commits across every accessible repository (or the comma-separated
//! `repositories` subset) and returns:
//! - Summary statistics (total commits, unique authors, most active day...)
//! - Per-repository commit counts
//! - An AI narrative when `ai=true`
//! - The commits themselves when `include_commits=true`

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::{authenticate, commit_query, non_empty, parse_date_range, parse_list};
use crate::error::{AppError, Result};
use crate::github::repositories::{fetch_commits_for_repositories, fetch_repositories};
use crate::models::{DataResponse, SummaryResponse};
use crate::session::Session;
use crate::state::SharedState;
use crate::stats::{calculate_summary_stats, filter_commits_by_date_range, group_commits_by_repository};

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/summary", get(get_summary))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    since: Option<String>,
    until: Option<String>,
    repositories: Option<String>,
    author: Option<String>,
    installation_id: Option<String>,
    #[serde(default)]
    ai: bool,
    #[serde(default)]
    include_commits: bool,
}

async fn get_summary(
    State(state): State<SharedState>,
    session: Session,
    WithRejection(Query(query), _): WithRejection<Query<SummaryQuery>, AppError>,
) -> Result<Json<DataResponse<SummaryResponse>>> {
    let range = parse_date_range(query.since.as_deref(), query.until.as_deref())?;
    let (method, client) = authenticate(&state, &session, query.installation_id.as_deref()).await?;

    // Fail before any fetching when the narrative cannot be produced
    let summarizer = match (query.ai, &state.summarizer) {
        (true, None) => return Err(AppError::SummarizerNotConfigured),
        (true, Some(summarizer)) => Some(summarizer),
        (false, _) => None,
    };

    let filter = parse_list(query.repositories.as_deref());
    let repositories = fetch_repositories(&client, filter.as_deref()).await?;

    let author = non_empty(query.author.as_deref()).map(str::to_string);
    let commits = fetch_commits_for_repositories(&client, &repositories, &commit_query(&range, author)?).await?;
    let commits = filter_commits_by_date_range(commits, range.since, range.until);

    let stats = calculate_summary_stats(&commits);
    tracing::info!(
        repositories = repositories.len(),
        commits = stats.total_commits,
        since = %range.since,
        until = %range.until,
        "Computed summary"
    );

    let ai_summary = match summarizer {
        Some(summarizer) => Some(summarizer.summarize(&commits, &stats, &range).await?),
        None => None,
    };

    let response = SummaryResponse {
        repository_activity: group_commits_by_repository(&commits),
        stats,
        date_range: range,
        auth_method: method.kind(),
        installation_id: method.installation_id(),
        ai_summary,
        commits: query.include_commits.then_some(commits),
    };

    Ok(Json(DataResponse::new(response)))
}
