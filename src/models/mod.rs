//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON (camelCase) for frontend consumption.
//! - `commit`: Commit, CommitAuthor
//! - `repository`: Repository, Installation, InstallationAccount
//! - `summary`: SummaryStats, AiSummary and the summary/activity payloads

pub mod commit;
pub mod repository;
pub mod summary;

pub use commit::*;
pub use repository::*;
pub use summary::*;

use serde::Serialize;

/// Success envelope: data routes answer `{ "data": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
