//! GitPulse - GitHub commit activity summaries over HTTP
//!
//! # Usage
//! ```bash
//! gitpulse                                   # Serve on 127.0.0.1:3001
//! gitpulse --port 8080                       # Different port
//! GITHUB_APP_ID=1 GITHUB_APP_PRIVATE_KEY_PATH=app.pem gitpulse
//! GEMINI_API_KEY=... gitpulse                # Enable AI summaries
//! ```

mod config;
mod error;
mod gemini;
mod github;
mod models;
mod routes;
mod session;
mod state;
mod stats;

use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gitpulse=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(config = ?cli.github, gemini = ?cli.gemini, "Loaded configuration");

    let state = Arc::new(AppState::from_config(&cli)?);
    let github_app = state.auth.app_configured();
    let ai_summaries = state.summarizer.is_some();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {addr}: {e}");
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let on_off = |enabled: bool| if enabled { "enabled" } else { "disabled" };
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │                  GitPulse                   │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  Server:       http://{addr}");
    println!("  GitHub API:   {}", cli.github.api_url);
    println!("  GitHub App:   {}", on_off(github_app));
    println!("  AI summaries: {}", on_off(ai_summaries));
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
