//! Authenticated GitHub REST client.
//!
//! A `GitHubClient` is bound to one bearer credential (an OAuth token or an
//! installation token) and is handed explicitly to every fetch function.
//! All failures come back classified as `GitHubError`.

use reqwest::header::{ACCEPT, HeaderMap, LINK};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::github::error::{GitHubError, classify_response, classify_transport};
use crate::models::AuthMethodKind;

pub const PER_PAGE: usize = 100;
pub const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    kind: AuthMethodKind,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("kind", &self.kind)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GitHubClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        kind: AuthMethodKind,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            kind,
        }
    }

    pub fn kind(&self) -> AuthMethodKind {
        self.kind
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<(HeaderMap, String), GitHubError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            let err = classify_response(status, &headers, &body);
            debug!(url = %url, status = status.as_u16(), code = err.code(), "GitHub request failed");
            return Err(err);
        }

        Ok((headers, body))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let (_, body) = self.send(path, query).await?;
        decode(path, &body)
    }

    /// Drain every page of a list endpoint that returns a bare JSON array.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, GitHubError> {
        self.get_paginated_with(path, query, |page: Vec<T>| page).await
    }

    /// Drain every page of a list endpoint, using `extract` to pull the items
    /// out of each page body (for endpoints that wrap their arrays).
    pub async fn get_paginated_with<P, T, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        extract: F,
    ) -> Result<Vec<T>, GitHubError>
    where
        P: DeserializeOwned,
        F: Fn(P) -> Vec<T>,
    {
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let mut page_query: Vec<(&str, String)> = query.to_vec();
            page_query.push(("per_page", PER_PAGE.to_string()));
            page_query.push(("page", page.to_string()));

            let (headers, body) = self.send(path, &page_query).await?;
            let page_items = extract(decode::<P>(path, &body)?);
            let count = page_items.len();
            items.extend(page_items);

            trace!(path, page, count, "Fetched page");

            if count < PER_PAGE || !has_next_page(&headers) {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, GitHubError> {
    serde_json::from_str(body)
        .map_err(|e| GitHubError::unknown(format!("Invalid response from GitHub for {path}: {e}")))
}

/// A missing `Link` header says nothing; a present one without `rel="next"`
/// marks the last page.
fn has_next_page(headers: &HeaderMap) -> bool {
    match headers.get(LINK).and_then(|v| v.to_str().ok()) {
        Some(link) => link
            .split(',')
            .any(|part| part.split(';').skip(1).any(|p| p.trim() == r#"rel="next""#)),
        None => true,
    }
}
