use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    github_app: bool,
    ai_summaries: bool,
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        github_app: state.auth.app_configured(),
        ai_summaries: state.summarizer.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::routes::test_support::get;
    use crate::state::test_support::state;

    #[tokio::test]
    async fn test_health_reports_features() {
        let (status, body) = get(routes(state("http://127.0.0.1:9", None)), "/api/health", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["githubApp"], false);
        assert_eq!(body["aiSummaries"], false);
    }
}
