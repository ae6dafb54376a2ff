//! Accessible repositories.
//!
//! GET /api/repos?installation_id=
//!
//! OAuth: every repository the user owns, collaborates on, or sees through an
//! organization. GitHub App: the repositories granted to the installation.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::authenticate;
use crate::error::{AppError, Result};
use crate::github::repositories::fetch_repositories;
use crate::models::{DataResponse, Repository};
use crate::session::Session;
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/repos", get(list_repositories))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReposQuery {
    installation_id: Option<String>,
}

async fn list_repositories(
    State(state): State<SharedState>,
    session: Session,
    WithRejection(Query(query), _): WithRejection<Query<ReposQuery>, AppError>,
) -> Result<Json<DataResponse<Vec<Repository>>>> {
    let (_, client) = authenticate(&state, &session, query.installation_id.as_deref()).await?;
    let repositories = fetch_repositories(&client, None).await?;
    Ok(Json(DataResponse::new(repositories)))
}
