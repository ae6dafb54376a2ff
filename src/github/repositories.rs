//! Repository and commit fetching.
//!
//! Every list call drains all pages before returning. Commit requests for
//! several repositories go out in fixed-size batches; each batch completes
//! before the next starts.
//!
//! Per-repository failures: `Auth`, `RateLimit` and `Config` abort the whole
//! fetch; any other error is logged and that repository contributes no
//! commits.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::github::client::GitHubClient;
use crate::github::error::GitHubError;
use crate::github::types::{ApiCommit, ApiRepository, ApiUser, InstallationRepositoriesPage};
use crate::models::{AuthMethodKind, Commit, Repository};

/// Upper bound on concurrent commit requests.
pub const COMMIT_FETCH_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct CommitQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    /// GitHub login or email.
    pub author: Option<String>,
}

/// All repositories visible to the client's identity, deduplicated by full
/// name and narrowed to `filter` when one is given.
///
/// Only the listing for the client's own auth method is fetched, so
/// deduplication applies within that one paged list (GitHub can repeat an
/// entry across pages when ordering shifts mid-pagination).
#[instrument(skip(client), fields(kind = ?client.kind()))]
pub async fn fetch_repositories(
    client: &GitHubClient,
    filter: Option<&[String]>,
) -> Result<Vec<Repository>, GitHubError> {
    let raw: Vec<ApiRepository> = match client.kind() {
        AuthMethodKind::OAuth => {
            let query = [
                ("affiliation", "owner,collaborator,organization_member".to_string()),
                ("visibility", "all".to_string()),
                ("sort", "updated".to_string()),
            ];
            client.get_paginated("/user/repos", &query).await?
        }
        AuthMethodKind::GithubApp => {
            client
                .get_paginated_with("/installation/repositories", &[], |page: InstallationRepositoriesPage| {
                    page.repositories
                })
                .await?
        }
    };

    let fetched = raw.len();
    let mut repositories = dedupe_repositories(raw.into_iter().map(Repository::from));

    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        let wanted: HashSet<String> = filter.iter().map(|name| name.trim().to_lowercase()).collect();
        repositories.retain(|r| wanted.contains(&r.full_name.to_lowercase()));
    }

    info!(fetched, kept = repositories.len(), "Fetched repositories");
    Ok(repositories)
}

/// Keep the first occurrence of each full name (case-insensitive).
pub fn dedupe_repositories(repositories: impl IntoIterator<Item = Repository>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    repositories
        .into_iter()
        .filter(|r| seen.insert(r.full_name.to_lowercase()))
        .collect()
}

/// Commits of one repository within the query window.
pub async fn fetch_commits(
    client: &GitHubClient,
    full_name: &str,
    query: &CommitQuery,
) -> Result<Vec<Commit>, GitHubError> {
    let mut params = vec![
        ("since", query.since.to_rfc3339()),
        ("until", query.until.to_rfc3339()),
    ];
    if let Some(author) = &query.author {
        params.push(("author", author.clone()));
    }

    let raw: Vec<ApiCommit> = client
        .get_paginated(&format!("/repos/{full_name}/commits"), &params)
        .await?;

    Ok(raw
        .into_iter()
        .filter_map(|c| c.into_commit(full_name))
        .collect())
}

/// Commits across repositories, fetched in batches of
/// `COMMIT_FETCH_BATCH_SIZE`.
#[instrument(skip(client, repositories, query), fields(repositories = repositories.len()))]
pub async fn fetch_commits_for_repositories(
    client: &GitHubClient,
    repositories: &[Repository],
    query: &CommitQuery,
) -> Result<Vec<Commit>, GitHubError> {
    let mut commits = Vec::new();
    let mut skipped = 0usize;

    for batch in repositories.chunks(COMMIT_FETCH_BATCH_SIZE) {
        let results = join_all(
            batch
                .iter()
                .map(|repo| fetch_commits(client, &repo.full_name, query)),
        )
        .await;

        for (repo, result) in batch.iter().zip(results) {
            match result {
                Ok(repo_commits) => commits.extend(repo_commits),
                Err(e) if e.aborts_batch() => {
                    warn!(repository = %repo.full_name, code = e.code(), error = %e, "Aborting commit fetch");
                    return Err(e);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(repository = %repo.full_name, code = e.code(), error = %e, "Skipping repository");
                }
            }
        }
    }

    commits.sort_by(|a, b| b.date.cmp(&a.date));
    info!(commits = commits.len(), skipped, "Fetched commits");
    Ok(commits)
}

/// The user behind an OAuth token.
pub async fn fetch_authenticated_user(client: &GitHubClient) -> Result<ApiUser, GitHubError> {
    client.get_json("/user", &[]).await
}
