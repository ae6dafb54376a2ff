//! GitHub App installations.
//!
//! - GET /api/installations: installations the OAuth user can access, the
//!   installation currently selected by cookie, and the App install URL
//! - GET /api/github/app/callback: GitHub's post-install redirect; stores the
//!   installation id in a cookie and sends the browser to the dashboard

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use super::non_empty;
use crate::error::{AppError, Result};
use crate::github::GitHubError;
use crate::github::installation::{INSTALLATION_COOKIE, installation_url, list_user_installations, resolve_installation_id};
use crate::models::{DataResponse, Installation};
use crate::session::Session;
use crate::state::SharedState;

const INSTALLATION_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/installations", get(list_installations))
        .route("/api/github/app/callback", get(app_callback))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstallationsResponse {
    installations: Vec<Installation>,
    current_installation_id: Option<u64>,
    install_url: Option<String>,
}

async fn list_installations(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<DataResponse<InstallationsResponse>>> {
    let token = session
        .access_token
        .as_deref()
        .ok_or_else(|| GitHubError::auth("Sign in with GitHub to list App installations"))?;

    let installations = list_user_installations(&state.auth.user_client(token)).await?;

    // A stale or malformed cookie just means nothing is selected here
    let current_installation_id = session.installation(None).ok().and_then(|resolved| resolved.id);

    Ok(Json(DataResponse::new(InstallationsResponse {
        installations,
        current_installation_id,
        install_url: state.app_slug.as_deref().map(installation_url),
    })))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    installation_id: Option<String>,
    setup_action: Option<String>,
}

async fn app_callback(
    State(state): State<SharedState>,
    WithRejection(Query(query), _): WithRejection<Query<CallbackQuery>, AppError>,
) -> Response {
    let dashboard = &state.dashboard_path;

    let raw = non_empty(query.installation_id.as_deref());
    let resolved = match resolve_installation_id(raw, None) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected App callback");
            return found(&format!("{dashboard}?error=invalid_installation"), None);
        }
    };

    let Some(id) = resolved.id else {
        tracing::warn!(setup_action = ?query.setup_action, "App callback without installation id");
        return found(&format!("{dashboard}?error=missing_installation"), None);
    };

    tracing::info!(installation_id = id, setup_action = ?query.setup_action, "GitHub App installed");
    found(dashboard, Some(installation_cookie(id)))
}

fn installation_cookie(id: u64) -> String {
    format!("{INSTALLATION_COOKIE}={id}; Path=/; Max-Age={INSTALLATION_COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax")
}

/// 302 redirect, optionally setting a cookie.
fn found(location: &str, cookie: Option<String>) -> Response {
    let mut response = (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response();
    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid installation cookie"),
        }
    }
    response
}
