//! Authentication: from session material to an authenticated client.
//!
//! A request carries an OAuth access token, a GitHub App installation id, or
//! both. `AuthMethod::select` decides once which one applies; the resolver
//! then produces a `GitHubClient` bound to that credential. Call sites never
//! branch on the strategy themselves.

use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument};

use crate::config::AppCredentials;
use crate::github::client::{GITHUB_API_VERSION, GitHubClient};
use crate::github::error::{GitHubError, classify_response, classify_transport};
use crate::github::installation::ResolvedInstallation;
use crate::github::jwt::generate_app_jwt;
use crate::github::types::AccessTokenResponse;
use crate::models::AuthMethodKind;

#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    OAuth { token: String },
    App { installation_id: u64 },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::OAuth { .. } => f.write_str("OAuth"),
            AuthMethod::App { installation_id } => {
                f.debug_struct("App").field("installation_id", installation_id).finish()
            }
        }
    }
}

impl AuthMethod {
    /// An installation id selects the App; otherwise the OAuth token is used.
    pub fn select(access_token: Option<&str>, installation: &ResolvedInstallation) -> Result<Self, GitHubError> {
        if let Some(installation_id) = installation.id {
            return Ok(AuthMethod::App { installation_id });
        }

        match access_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Ok(AuthMethod::OAuth {
                token: token.to_string(),
            }),
            None => Err(GitHubError::auth(
                "No GitHub credentials: sign in or install the GitHub App",
            )),
        }
    }

    pub fn kind(&self) -> AuthMethodKind {
        match self {
            AuthMethod::OAuth { .. } => AuthMethodKind::OAuth,
            AuthMethod::App { .. } => AuthMethodKind::GithubApp,
        }
    }

    pub fn installation_id(&self) -> Option<u64> {
        match self {
            AuthMethod::App { installation_id } => Some(*installation_id),
            AuthMethod::OAuth { .. } => None,
        }
    }
}

/// Builds authenticated clients. Holds only immutable configuration.
#[derive(Clone)]
pub struct AuthResolver {
    http: reqwest::Client,
    api_url: String,
    app: Option<AppCredentials>,
}

impl AuthResolver {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, app: Option<AppCredentials>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            app,
        }
    }

    pub fn app_configured(&self) -> bool {
        self.app.is_some()
    }

    /// A client acting as the OAuth user, whatever method the request selected.
    pub fn user_client(&self, token: &str) -> GitHubClient {
        GitHubClient::new(self.http.clone(), &self.api_url, token, AuthMethodKind::OAuth)
    }

    #[instrument(skip(self))]
    pub async fn authenticate(&self, method: &AuthMethod) -> Result<GitHubClient, GitHubError> {
        match method {
            AuthMethod::OAuth { token } => Ok(self.user_client(token)),
            AuthMethod::App { installation_id } => {
                let token = self.mint_installation_token(*installation_id).await?;
                Ok(GitHubClient::new(
                    self.http.clone(),
                    &self.api_url,
                    token,
                    AuthMethodKind::GithubApp,
                ))
            }
        }
    }

    async fn mint_installation_token(&self, installation_id: u64) -> Result<String, GitHubError> {
        let app = self.app.as_ref().ok_or_else(|| {
            GitHubError::config("GitHub App is not configured: set GITHUB_APP_ID and GITHUB_APP_PRIVATE_KEY")
        })?;

        let jwt = generate_app_jwt(app.app_id, &app.private_key_pem)?;
        let url = format!("{}/app/installations/{installation_id}/access_tokens", self.api_url);
        debug!(installation_id, "Requesting installation token");

        let response = self
            .http
            .post(&url)
            .bearer_auth(jwt)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_response(status, &headers, &body));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::unknown(format!("Invalid installation token response: {e}")))?;

        info!(installation_id, expires_at = ?token.expires_at, "Minted installation token");
        Ok(token.token)
    }
}
