//! GitHub access: authentication, paginated fetching and error
//! classification. Every fetch function takes its authenticated
//! `GitHubClient` explicitly.

pub mod auth;
pub mod client;
pub mod error;
pub mod installation;
pub mod jwt;
pub mod repositories;
pub mod types;

pub use auth::{AuthMethod, AuthResolver};
pub use client::GitHubClient;
pub use error::GitHubError;
pub use installation::{InstallationSource, InvalidInstallationId, ResolvedInstallation};
