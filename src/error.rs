//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure a route can return and implements
//! Axum's `IntoResponse` so handlers can use `?`. This is the only place
//! errors become status codes; the table is fixed:
//!
//! - `GitHub(Config)` → 500 `GITHUB_CONFIG_ERROR`
//! - `GitHub(Auth)` → 401 `GITHUB_AUTH_ERROR` + `signOutRequired`
//! - `GitHub(RateLimit)` → 429 `GITHUB_RATE_LIMIT_ERROR` + `resetAt`
//! - `GitHub(NotFound)` → 404 `GITHUB_NOT_FOUND_ERROR`
//! - `GitHub(Api)` → 500 `GITHUB_API_ERROR`
//! - `GitHub(Unknown)` → 500 `UNKNOWN_ERROR`
//! - `InvalidInstallationId` → 400 `INVALID_INSTALLATION_ID` + `source`
//! - `InvalidRequest` / `InvalidQuery` → 400 `INVALID_REQUEST`
//! - `SummarizerNotConfigured` → 500 `AI_CONFIG_ERROR`
//! - `Summarizer` → 502 `AI_SUMMARY_ERROR`

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::gemini::GeminiError;
use crate::github::{GitHubError, InstallationSource, InvalidInstallationId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    InvalidInstallationId(#[from] InvalidInstallationId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("AI summaries are not configured")]
    SummarizerNotConfigured,

    #[error("AI summary failed: {0}")]
    Summarizer(#[from] GeminiError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sign_out_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<InstallationSource>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            sign_out_required: None,
            reset_at: None,
            source: None,
        }
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::GitHub(e) => {
                let status = match e {
                    GitHubError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    GitHubError::Auth { .. } => StatusCode::UNAUTHORIZED,
                    GitHubError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
                    GitHubError::NotFound { .. } => StatusCode::NOT_FOUND,
                    GitHubError::Api { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    GitHubError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let mut body = ErrorBody::new(github_headline(e), e.code());
                body.details = Some(e.message().to_string());
                body.sign_out_required = e.sign_out_required().then_some(true);
                body.reset_at = e.reset_at();
                (status, body)
            }
            AppError::InvalidInstallationId(e) => {
                let mut body = ErrorBody::new("Invalid installation ID", "INVALID_INSTALLATION_ID");
                body.details = Some(e.to_string());
                body.source = Some(e.origin);
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(msg.clone(), "INVALID_REQUEST"),
            ),
            AppError::InvalidQuery(rejection) => {
                let mut body = ErrorBody::new("Invalid query string", "INVALID_REQUEST");
                body.details = Some(rejection.body_text());
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::SummarizerNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("AI summaries are not configured", "AI_CONFIG_ERROR"),
            ),
            AppError::Summarizer(e) => {
                let mut body = ErrorBody::new("Failed to generate AI summary", "AI_SUMMARY_ERROR");
                body.details = Some(e.to_string());
                (StatusCode::BAD_GATEWAY, body)
            }
        }
    }
}

fn github_headline(e: &GitHubError) -> &'static str {
    match e {
        GitHubError::Config { .. } => "GitHub integration is misconfigured",
        GitHubError::Auth { .. } => "GitHub authentication failed. Please sign in again.",
        GitHubError::RateLimit { .. } => "GitHub API rate limit exceeded",
        GitHubError::NotFound { .. } => "GitHub resource not found",
        GitHubError::Api { .. } => "GitHub API request failed",
        GitHubError::Unknown { .. } => "An unexpected error occurred",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code = body.code, error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), code = body.code, error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_auth_error_requests_sign_out() {
        let (status, body) = render(GitHubError::auth("Bad credentials").into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "GITHUB_AUTH_ERROR");
        assert_eq!(body["signOutRequired"], true);
        assert_eq!(body["details"], "Bad credentials");
        assert!(body.get("resetAt").is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_carries_reset_at() {
        let reset_at = Utc.timestamp_opt(1_705_312_800, 0).unwrap();
        let (status, body) = render(
            GitHubError::RateLimit {
                message: "API rate limit exceeded".into(),
                reset_at,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "GITHUB_RATE_LIMIT_ERROR");
        assert_eq!(body["resetAt"], "2024-01-15T10:00:00Z");
        assert!(body.get("signOutRequired").is_none());
    }

    #[tokio::test]
    async fn test_status_table() {
        let cases: Vec<(AppError, StatusCode, &str)> = vec![
            (GitHubError::config("x").into(), StatusCode::INTERNAL_SERVER_ERROR, "GITHUB_CONFIG_ERROR"),
            (GitHubError::not_found("x").into(), StatusCode::NOT_FOUND, "GITHUB_NOT_FOUND_ERROR"),
            (
                GitHubError::Api {
                    status: 502,
                    message: "x".into(),
                }
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "GITHUB_API_ERROR",
            ),
            (GitHubError::unknown("x").into(), StatusCode::INTERNAL_SERVER_ERROR, "UNKNOWN_ERROR"),
            (AppError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            (AppError::SummarizerNotConfigured, StatusCode::INTERNAL_SERVER_ERROR, "AI_CONFIG_ERROR"),
            (
                GeminiError::EmptyResponse.into(),
                StatusCode::BAD_GATEWAY,
                "AI_SUMMARY_ERROR",
            ),
        ];

        for (err, expected_status, expected_code) in cases {
            let (status, body) = render(err).await;
            assert_eq!(status, expected_status, "{expected_code}");
            assert_eq!(body["code"], expected_code);
        }
    }

    #[tokio::test]
    async fn test_invalid_installation_reports_source() {
        let err = InvalidInstallationId {
            value: "abc".into(),
            origin: InstallationSource::Query,
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INSTALLATION_ID");
        assert_eq!(body["source"], "query");
    }
}
