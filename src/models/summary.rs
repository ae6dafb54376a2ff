//! Summary DTOs.
//!
//! - `SummaryStats`: aggregate over a commit list (see `crate::stats`)
//! - `RepositoryActivity`: per-repository commit count
//! - `AiSummary`: structured narrative returned by the summarizer
//! - `SummaryResponse` / `ActivityResponse`: route payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Commit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_commits: usize,
    pub unique_authors: usize,
    pub repositories: Vec<String>,
    /// `YYYY-MM-DD`, empty when there are no commits.
    pub most_active_day: String,
    pub average_commits_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryActivity {
    pub repository: String,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthMethodKind {
    #[serde(rename = "oauth")]
    OAuth,
    #[serde(rename = "github_app")]
    GithubApp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub technical_areas: Vec<TechnicalArea>,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub commits_by_type: Vec<CommitTypeCount>,
    #[serde(default)]
    pub timeline_highlights: Vec<TimelineHighlight>,
    #[serde(default)]
    pub overall_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalArea {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineHighlight {
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub stats: SummaryStats,
    pub date_range: DateRange,
    pub auth_method: AuthMethodKind,
    pub installation_id: Option<u64>,
    pub repository_activity: Vec<RepositoryActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<AiSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<Commit>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub login: String,
    #[serde(flatten)]
    pub stats: SummaryStats,
    pub date_range: DateRange,
    pub repository_activity: Vec<RepositoryActivity>,
    pub commits: Vec<Commit>,
}
