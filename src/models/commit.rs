use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: CommitAuthor,
    pub date: DateTime<Utc>,
    /// Full name (`owner/name`) of the repository the commit was fetched from.
    pub repository: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAuthor {
    /// GitHub login, absent when the commit email is not linked to an account.
    pub login: Option<String>,
    pub name: String,
    pub email: Option<String>,
}

impl CommitAuthor {
    /// Identity used for author counting: login when known, else the git name.
    pub fn identity(&self) -> &str {
        self.login.as_deref().unwrap_or(&self.name)
    }
}
