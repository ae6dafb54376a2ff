//! Session material carried by each request.
//!
//! The web front end owns sign-in and cookie issuance; the service only
//! reads what the browser sends:
//! - OAuth token: `Authorization: Bearer <token>` or the `github_access_token` cookie
//! - installation id: the `github_installation_id` cookie (the `installation_id`
//!   query parameter is read by the handlers and takes precedence)

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use crate::github::installation::{INSTALLATION_COOKIE, resolve_installation_id};
use crate::github::{AuthMethod, InvalidInstallationId, ResolvedInstallation};

pub const ACCESS_TOKEN_COOKIE: &str = "github_access_token";

#[derive(Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub installation_cookie: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("installation_cookie", &self.installation_cookie)
            .finish()
    }
}

impl Session {
    pub fn from_parts(parts: &Parts) -> Self {
        let jar = CookieJar::from_headers(&parts.headers);

        let access_token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string())
            .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
            .filter(|t| !t.trim().is_empty());

        Self {
            access_token,
            installation_cookie: jar.get(INSTALLATION_COOKIE).map(|c| c.value().to_string()),
        }
    }

    pub fn installation(&self, query: Option<&str>) -> Result<ResolvedInstallation, InvalidInstallationId> {
        resolve_installation_id(query, self.installation_cookie.as_deref())
    }

    pub fn auth_method(&self, installation: &ResolvedInstallation) -> Result<AuthMethod, crate::github::GitHubError> {
        AuthMethod::select(self.access_token.as_deref(), installation)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/summary");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let session = Session::from_parts(&parts(&[
            ("authorization", "Bearer header-token"),
            ("cookie", "github_access_token=cookie-token; github_installation_id=99"),
        ]));
        assert_eq!(session.access_token.as_deref(), Some("header-token"));
        assert_eq!(session.installation_cookie.as_deref(), Some("99"));
    }

    #[test]
    fn test_cookie_token_used_without_header() {
        let session = Session::from_parts(&parts(&[("cookie", "github_access_token=cookie-token")]));
        assert_eq!(session.access_token.as_deref(), Some("cookie-token"));
        assert!(session.installation_cookie.is_none());
    }

    #[test]
    fn test_empty_session() {
        let session = Session::from_parts(&parts(&[]));
        assert!(session.access_token.is_none());
        assert!(session.auth_method(&session.installation(None).unwrap()).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session {
            access_token: Some("gho_secret".into()),
            installation_cookie: None,
        };
        assert!(!format!("{session:?}").contains("gho_secret"));
    }
}
