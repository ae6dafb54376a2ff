//! The signed-in user's own activity.
//!
//! GET /api/my-activity?since=&until=&installation_id=&author=
//!
//! Same pipeline as the summary, restricted to one author. The author is the
//! `author` parameter when given, else the login behind the OAuth token.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::{authenticate, commit_query, non_empty, parse_date_range};
use crate::error::{AppError, Result};
use crate::github::repositories::{fetch_authenticated_user, fetch_commits_for_repositories, fetch_repositories};
use crate::models::{ActivityResponse, DataResponse};
use crate::session::Session;
use crate::state::{AppState, SharedState};
use crate::stats::{calculate_summary_stats, filter_commits_by_date_range, group_commits_by_repository};

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/my-activity", get(get_my_activity))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    since: Option<String>,
    until: Option<String>,
    installation_id: Option<String>,
    author: Option<String>,
}

async fn get_my_activity(
    State(state): State<SharedState>,
    session: Session,
    WithRejection(Query(query), _): WithRejection<Query<ActivityQuery>, AppError>,
) -> Result<Json<DataResponse<ActivityResponse>>> {
    let range = parse_date_range(query.since.as_deref(), query.until.as_deref())?;
    let (_, client) = authenticate(&state, &session, query.installation_id.as_deref()).await?;
    let login = resolve_login(&state, &session, query.author.as_deref()).await?;

    let repositories = fetch_repositories(&client, None).await?;
    let commits =
        fetch_commits_for_repositories(&client, &repositories, &commit_query(&range, Some(login.clone()))?).await?;
    let commits = filter_commits_by_date_range(commits, range.since, range.until);

    tracing::info!(login = %login, commits = commits.len(), "Computed activity");

    Ok(Json(DataResponse::new(ActivityResponse {
        stats: calculate_summary_stats(&commits),
        repository_activity: group_commits_by_repository(&commits),
        login,
        date_range: range,
        commits,
    })))
}

async fn resolve_login(state: &AppState, session: &Session, author: Option<&str>) -> Result<String> {
    if let Some(author) = non_empty(author) {
        return Ok(author.to_string());
    }

    let token = session.access_token.as_deref().ok_or_else(|| {
        AppError::InvalidRequest("author is required when no GitHub user is signed in".to_string())
    })?;
    let user = fetch_authenticated_user(&state.auth.user_client(token)).await?;
    Ok(user.login)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::github::client::test_support::repo_items;
    use crate::routes::test_support::get;
    use crate::state::test_support::state;

    async fn github() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "login": "octocat" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(repo_items("r", 1)))
            .mount(&server)
            .await;

        server
    }

    fn commits_by(login: &str) -> serde_json::Value {
        serde_json::json!([{
            "sha": "abc",
            "html_url": "https://github.com/org/r0/commit/abc",
            "author": { "login": login },
            "commit": {
                "message": "Fix parser",
                "author": { "name": login, "email": null, "date": "2024-01-10T10:00:00Z" },
                "committer": null
            }
        }])
    }

    #[tokio::test]
    async fn test_activity_uses_token_owner() {
        let server = github().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/r0/commits"))
            .and(query_param("author", "octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commits_by("octocat")))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(
            routes(state(&server.uri(), None)),
            "/api/my-activity?since=2024-01-01&until=2024-01-31",
            &[("cookie", "github_access_token=gho_test")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["login"], "octocat");
        assert_eq!(body["data"]["totalCommits"], 1);
        assert_eq!(body["data"]["commits"][0]["sha"], "abc");
    }

    #[tokio::test]
    async fn test_activity_explicit_author() {
        let server = github().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/r0/commits"))
            .and(query_param("author", "hubot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commits_by("hubot")))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(
            routes(state(&server.uri(), None)),
            "/api/my-activity?since=2024-01-01&until=2024-01-31&author=hubot",
            &[("authorization", "Bearer gho_test")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["login"], "hubot");
    }

    #[tokio::test]
    async fn test_activity_revoked_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({ "message": "Bad credentials" })))
            .mount(&server)
            .await;

        let (status, body) = get(
            routes(state(&server.uri(), None)),
            "/api/my-activity",
            &[("authorization", "Bearer gho_revoked")],
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["signOutRequired"], true);
        assert_eq!(body["details"], "Bad credentials");
    }
}
