//! Shared, immutable per-process state handed to every route.

use std::sync::Arc;

use crate::config::Cli;
use crate::gemini::GeminiClient;
use crate::github::AuthResolver;

const USER_AGENT: &str = concat!("gitpulse/", env!("CARGO_PKG_VERSION"));

pub struct AppState {
    pub auth: AuthResolver,
    pub summarizer: Option<GeminiClient>,
    pub app_slug: Option<String>,
    pub dashboard_path: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn from_config(cli: &Cli) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            auth: AuthResolver::new(http.clone(), &cli.github.api_url, cli.github.app_credentials()),
            summarizer: GeminiClient::from_config(http, &cli.gemini),
            app_slug: cli.github.app_slug.clone(),
            dashboard_path: cli.dashboard_path.clone(),
        })
    }
}
