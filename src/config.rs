//! Command line / environment configuration.
//!
//! Every flag can also be supplied through the environment variable named
//! next to it. Secrets are redacted from `Debug` output.

use std::path::PathBuf;

use clap::{Args, Parser};
use tracing::warn;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// GitPulse - GitHub commit activity summaries
#[derive(Parser, Clone)]
#[command(name = "gitpulse")]
#[command(about = "Summarize GitHub commit activity over HTTP", long_about = None)]
pub struct Cli {
    /// Address to bind the server to
    #[arg(long, env = "GITPULSE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to run the server on
    #[arg(short, long, env = "GITPULSE_PORT", default_value = "3001")]
    pub port: u16,

    /// Where the GitHub App callback sends the browser afterwards
    #[arg(long, env = "GITPULSE_DASHBOARD_PATH", default_value = "/dashboard")]
    pub dashboard_path: String,

    #[command(flatten)]
    pub github: GitHubConfig,

    #[command(flatten)]
    pub gemini: GeminiConfig,
}

#[derive(Args, Clone, Default)]
pub struct GitHubConfig {
    /// GitHub REST API base URL (GitHub Enterprise or testing)
    #[arg(id = "github_api_url", long = "github-api-url", env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub api_url: String,

    /// GitHub App numeric ID
    #[arg(long = "github-app-id", env = "GITHUB_APP_ID")]
    pub app_id: Option<u64>,

    /// PEM-encoded GitHub App private key (literal `\n` sequences allowed)
    #[arg(long = "github-app-private-key", env = "GITHUB_APP_PRIVATE_KEY", hide_env_values = true, allow_hyphen_values = true)]
    pub private_key: Option<String>,

    /// Path to the GitHub App private key, used when the key itself is not set
    #[arg(long = "github-app-private-key-path", env = "GITHUB_APP_PRIVATE_KEY_PATH")]
    pub private_key_path: Option<PathBuf>,

    /// GitHub App slug, used to build the installation URL
    #[arg(long = "github-app-slug", env = "GITHUB_APP_SLUG")]
    pub app_slug: Option<String>,
}

#[derive(Args, Clone, Default)]
pub struct GeminiConfig {
    /// Gemini API key; AI summaries are unavailable without it
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    /// Gemini API base URL
    #[arg(id = "gemini_api_url", long = "gemini-api-url", env = "GEMINI_API_URL", default_value = DEFAULT_GEMINI_API_URL)]
    pub api_url: String,
}

/// Credentials needed to act as the GitHub App.
#[derive(Clone)]
pub struct AppCredentials {
    pub app_id: u64,
    pub private_key_pem: String,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("private_key_pem", &"[REDACTED]")
            .finish()
    }
}

impl GitHubConfig {
    /// App credentials, or `None` when the App is not (fully) configured.
    ///
    /// A partial configuration is logged and treated as absent, so requests
    /// that need the App fail with a configuration error instead of the
    /// server refusing to start.
    pub fn app_credentials(&self) -> Option<AppCredentials> {
        let key = match (&self.private_key, &self.private_key_path) {
            (Some(key), _) if !key.trim().is_empty() => Some(normalize_pem(key)),
            (_, Some(path)) => match std::fs::read_to_string(path) {
                Ok(key) => Some(normalize_pem(&key)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read GitHub App private key");
                    None
                }
            },
            _ => None,
        };

        match (self.app_id, key) {
            (Some(app_id), Some(private_key_pem)) => Some(AppCredentials {
                app_id,
                private_key_pem,
            }),
            (None, None) => None,
            (Some(_), None) => {
                warn!("GITHUB_APP_ID is set but no private key is configured; GitHub App auth disabled");
                None
            }
            (None, Some(_)) => {
                warn!("GitHub App private key is set but GITHUB_APP_ID is missing; GitHub App auth disabled");
                None
            }
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("private_key_path", &self.private_key_path)
            .field("app_slug", &self.app_slug)
            .finish()
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Keys passed through env files often arrive with escaped newlines.
fn normalize_pem(raw: &str) -> String {
    raw.trim().replace("\\n", "\n")
}
