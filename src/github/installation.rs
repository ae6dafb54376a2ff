//! GitHub App installation lookup.
//!
//! The installation a request acts on comes from the `installation_id`
//! query parameter or, failing that, the installation cookie set by the App
//! callback. Nothing is stored server-side.

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::info;

use crate::github::client::GitHubClient;
use crate::github::error::GitHubError;
use crate::github::types::UserInstallationsPage;
use crate::models::Installation;

pub const INSTALLATION_COOKIE: &str = "github_installation_id";

/// Where a request's installation id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationSource {
    Query,
    Cookie,
    None,
}

impl InstallationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallationSource::Query => "query",
            InstallationSource::Cookie => "cookie",
            InstallationSource::None => "none",
        }
    }
}

impl std::fmt::Display for InstallationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstallationSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInstallation {
    pub id: Option<u64>,
    pub source: InstallationSource,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid installation id '{value}' from {origin}")]
pub struct InvalidInstallationId {
    pub value: String,
    pub origin: InstallationSource,
}

/// Pick the installation id for this request. The query parameter wins over
/// the cookie; blank values count as absent. A malformed value is an error
/// attributed to where it came from, never a silent fallback.
pub fn resolve_installation_id(
    query: Option<&str>,
    cookie: Option<&str>,
) -> Result<ResolvedInstallation, InvalidInstallationId> {
    let candidates = [
        (query, InstallationSource::Query),
        (cookie, InstallationSource::Cookie),
    ];

    for (raw, source) in candidates {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };

        return match raw.parse::<u64>() {
            Ok(id) if id > 0 => Ok(ResolvedInstallation {
                id: Some(id),
                source,
            }),
            _ => Err(InvalidInstallationId {
                value: raw.to_string(),
                origin: source,
            }),
        };
    }

    Ok(ResolvedInstallation {
        id: None,
        source: InstallationSource::None,
    })
}

/// Installations of the App the OAuth user can access.
pub async fn list_user_installations(client: &GitHubClient) -> Result<Vec<Installation>, GitHubError> {
    let installations = client
        .get_paginated_with("/user/installations", &[], |page: UserInstallationsPage| {
            page.installations
        })
        .await?;

    info!(count = installations.len(), "Fetched user installations");
    Ok(installations.into_iter().map(Installation::from).collect())
}

pub fn installation_url(app_slug: &str) -> String {
    format!("https://github.com/apps/{app_slug}/installations/new")
}
