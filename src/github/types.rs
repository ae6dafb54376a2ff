//! Raw GitHub REST payloads, converted into `crate::models` before leaving
//! the `github` module.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Commit, CommitAuthor, Installation, InstallationAccount, Repository};

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub login: String,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: ApiUser,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ApiRepository> for Repository {
    fn from(repo: ApiRepository) -> Self {
        Repository {
            id: repo.id,
            full_name: repo.full_name,
            name: repo.name,
            owner: repo.owner.login,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
            private: repo.private,
            html_url: repo.html_url,
            updated_at: repo.updated_at,
        }
    }
}

/// `GET /installation/repositories` wraps its items.
#[derive(Debug, Deserialize)]
pub struct InstallationRepositoriesPage {
    #[serde(default)]
    pub repositories: Vec<ApiRepository>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    pub html_url: String,
    pub commit: ApiCommitData,
    /// Null when the commit email is not linked to a GitHub account.
    pub author: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCommitData {
    pub message: String,
    pub author: Option<ApiGitSignature>,
    pub committer: Option<ApiGitSignature>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGitSignature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl ApiCommit {
    /// Returns `None` for commits that carry no usable date.
    pub fn into_commit(self, repository: &str) -> Option<Commit> {
        let ApiCommitData {
            message,
            author,
            committer,
        } = self.commit;

        let date = author
            .as_ref()
            .and_then(|a| a.date)
            .or_else(|| committer.as_ref().and_then(|c| c.date))?;

        let login = self.author.map(|u| u.login);
        let name = author
            .as_ref()
            .and_then(|a| a.name.clone())
            .or_else(|| login.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let email = author.and_then(|a| a.email);

        Some(Commit {
            sha: self.sha,
            message,
            author: CommitAuthor { login, name, email },
            date,
            repository: repository.to_string(),
            url: self.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiInstallation {
    pub id: u64,
    pub account: Option<ApiUser>,
    pub target_type: Option<String>,
}

impl From<ApiInstallation> for Installation {
    fn from(installation: ApiInstallation) -> Self {
        Installation {
            id: installation.id,
            account: installation.account.map(|a| InstallationAccount {
                login: a.login,
                kind: a.kind.unwrap_or_else(|| "User".to_string()),
                avatar_url: a.avatar_url,
            }),
            target_type: installation.target_type,
        }
    }
}

/// `GET /user/installations` wraps its items.
#[derive(Debug, Deserialize)]
pub struct UserInstallationsPage {
    #[serde(default)]
    pub installations: Vec<ApiInstallation>,
}

#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_without_linked_account_uses_git_name() {
        let raw: ApiCommit = serde_json::from_value(serde_json::json!({
            "sha": "abc123",
            "html_url": "https://github.com/org/r1/commit/abc123",
            "author": null,
            "commit": {
                "message": "Fix parser",
                "author": { "name": "Alice", "email": "alice@example.com", "date": "2024-01-15T10:00:00Z" },
                "committer": { "name": "GitHub", "email": "noreply@github.com", "date": "2024-01-15T11:00:00Z" }
            }
        }))
        .unwrap();

        let commit = raw.into_commit("org/r1").unwrap();
        assert_eq!(commit.author.login, None);
        assert_eq!(commit.author.name, "Alice");
        assert_eq!(commit.repository, "org/r1");
        assert_eq!(commit.date.to_rfc3339(), "2024-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_commit_without_dates_is_dropped() {
        let raw: ApiCommit = serde_json::from_value(serde_json::json!({
            "sha": "abc123",
            "html_url": "https://github.com/org/r1/commit/abc123",
            "author": { "login": "alice" },
            "commit": { "message": "m", "author": null, "committer": null }
        }))
        .unwrap();

        assert!(raw.into_commit("org/r1").is_none());
    }
}
