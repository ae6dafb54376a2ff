//! GitHub error taxonomy and the classifier that produces it.
//!
//! Every failure leaving the `github` module is one of these variants. The
//! HTTP boundary (`crate::error`) maps each variant to a fixed status and
//! code and performs no classification of its own.
//!
//! Classification:
//! - 401, 403 → `Auth` (client must sign out)
//! - 404 → `NotFound`
//! - 429 → `RateLimit` with the reset time from the response headers
//! - other status → `Api`
//! - no status (transport, decoding) → `Unknown`

use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use thiserror::Error;

/// Used when a 429 carries neither `x-ratelimit-reset` nor `retry-after`.
const DEFAULT_RATE_LIMIT_WAIT_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub configuration error: {message}")]
    Config { message: String },

    #[error("GitHub authentication error: {message}")]
    Auth { message: String },

    #[error("GitHub rate limit exceeded: {message} (resets at {reset_at})")]
    RateLimit {
        message: String,
        reset_at: DateTime<Utc>,
    },

    #[error("GitHub resource not found: {message}")]
    NotFound { message: String },

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl GitHubError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            GitHubError::Config { .. } => "GITHUB_CONFIG_ERROR",
            GitHubError::Auth { .. } => "GITHUB_AUTH_ERROR",
            GitHubError::RateLimit { .. } => "GITHUB_RATE_LIMIT_ERROR",
            GitHubError::NotFound { .. } => "GITHUB_NOT_FOUND_ERROR",
            GitHubError::Api { .. } => "GITHUB_API_ERROR",
            GitHubError::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GitHubError::Config { message }
            | GitHubError::Auth { message }
            | GitHubError::RateLimit { message, .. }
            | GitHubError::NotFound { message }
            | GitHubError::Api { message, .. }
            | GitHubError::Unknown { message } => message,
        }
    }

    pub fn sign_out_required(&self) -> bool {
        matches!(self, GitHubError::Auth { .. })
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            GitHubError::RateLimit { reset_at, .. } => Some(*reset_at),
            _ => None,
        }
    }

    /// Identity and quota failures stop a multi-repository fetch; anything
    /// else only affects the repository it came from.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            GitHubError::Auth { .. } | GitHubError::RateLimit { .. } | GitHubError::Config { .. }
        )
    }
}

#[derive(Deserialize)]
struct GitHubErrorBody {
    message: Option<String>,
}

/// Classify a non-success GitHub response.
pub fn classify_response(status: StatusCode, headers: &HeaderMap, body: &str) -> GitHubError {
    let message = serde_json::from_str::<GitHubErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        });

    match status.as_u16() {
        401 | 403 => GitHubError::Auth { message },
        404 => GitHubError::NotFound { message },
        429 => GitHubError::RateLimit {
            message,
            reset_at: parse_reset_at(headers, Utc::now()),
        },
        status => GitHubError::Api { status, message },
    }
}

/// Classify a failure raised by the HTTP client itself.
pub fn classify_transport(error: reqwest::Error) -> GitHubError {
    if let Some(status) = error.status() {
        return classify_response(status, &HeaderMap::new(), "");
    }
    GitHubError::Unknown {
        message: error.to_string(),
    }
}

fn parse_reset_at(headers: &HeaderMap, now: DateTime<Utc>) -> DateTime<Utc> {
    let header_i64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(reset) = header_i64("x-ratelimit-reset")
        && let Some(at) = Utc.timestamp_opt(reset, 0).single()
    {
        return at;
    }

    let wait = header_i64("retry-after").unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS);
    now + chrono::Duration::seconds(wait.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_401_and_403_require_sign_out() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = classify_response(status, &HeaderMap::new(), r#"{"message":"Bad credentials"}"#);
            assert!(matches!(err, GitHubError::Auth { .. }));
            assert!(err.sign_out_required());
            assert_eq!(err.message(), "Bad credentials");
            assert_eq!(err.code(), "GITHUB_AUTH_ERROR");
        }
    }

    #[test]
    fn test_404_is_not_found() {
        let err = classify_response(StatusCode::NOT_FOUND, &HeaderMap::new(), "");
        assert!(matches!(err, GitHubError::NotFound { .. }));
        assert_eq!(err.message(), "Not Found");
        assert!(!err.sign_out_required());
    }

    #[test]
    fn test_429_parses_reset_header() {
        let err = classify_response(
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("x-ratelimit-reset", "1705312800")]),
            r#"{"message":"API rate limit exceeded"}"#,
        );
        let expected = Utc.timestamp_opt(1_705_312_800, 0).unwrap();
        assert_eq!(err.reset_at(), Some(expected));
        assert_eq!(err.code(), "GITHUB_RATE_LIMIT_ERROR");
    }

    #[test]
    fn test_reset_falls_back_to_retry_after() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let at = parse_reset_at(&headers(&[("retry-after", "30")]), now);
        assert_eq!(at, now + chrono::Duration::seconds(30));
    }

    #[test]
    fn test_reset_defaults_without_headers() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let at = parse_reset_at(&HeaderMap::new(), now);
        assert_eq!(at, now + chrono::Duration::seconds(DEFAULT_RATE_LIMIT_WAIT_SECS));
    }

    #[test]
    fn test_other_status_is_api_error() {
        let err = classify_response(StatusCode::CONFLICT, &HeaderMap::new(), r#"{"message":"Git Repository is empty."}"#);
        match err {
            GitHubError::Api { status, ref message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Git Repository is empty.");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_abort_policy() {
        assert!(GitHubError::auth("x").aborts_batch());
        assert!(GitHubError::config("x").aborts_batch());
        assert!(
            GitHubError::RateLimit {
                message: "x".into(),
                reset_at: Utc::now()
            }
            .aborts_batch()
        );
        assert!(!GitHubError::not_found("x").aborts_batch());
        assert!(!GitHubError::unknown("x").aborts_batch());
        assert!(
            !GitHubError::Api {
                status: 500,
                message: "x".into()
            }
            .aborts_batch()
        );
    }
}
