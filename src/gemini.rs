//! Gemini client for AI commit narratives.
//!
//! One `generateContent` call per summary. The model is asked for JSON and
//! its answer is parsed into `AiSummary`; anything else is an error, never a
//! partial summary.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::GeminiConfig;
use crate::models::{AiSummary, Commit, DateRange, SummaryStats};

/// Prompts carry at most this many commits, newest first.
const MAX_PROMPT_COMMITS: usize = 500;
/// Commit messages are cut to their first line and this many characters.
const MAX_MESSAGE_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Gemini API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Gemini returned no content")]
    EmptyResponse,

    #[error("Invalid summary from Gemini: {0}")]
    InvalidSummary(String),
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// `None` when no API key is configured.
    pub fn from_config(http: Client, config: &GeminiConfig) -> Option<Self> {
        let api_key = config.api_key.as_ref().filter(|k| !k.trim().is_empty())?;
        info!(model = %config.model, "Gemini summaries enabled");
        Some(Self {
            http,
            api_key: api_key.trim().to_string(),
            model: config.model.clone(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self, commits, stats), fields(model = %self.model, commits = commits.len()))]
    pub async fn summarize(
        &self,
        commits: &[Commit],
        stats: &SummaryStats,
        range: &DateRange,
    ) -> Result<AiSummary, GeminiError> {
        let prompt = build_prompt(commits, stats, range);
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        debug!(prompt_chars = prompt.len(), "Sending summary request");

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini request failed");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .filter(|t: &String| !t.trim().is_empty())
            .ok_or(GeminiError::EmptyResponse)?;

        parse_summary(&text)
    }
}

/// Parse the model's JSON answer, tolerating a surrounding code fence.
pub fn parse_summary(text: &str) -> Result<AiSummary, GeminiError> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(json.trim()).map_err(|e| GeminiError::InvalidSummary(e.to_string()))
}

pub fn build_prompt(commits: &[Commit], stats: &SummaryStats, range: &DateRange) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are analysing a developer's GitHub commit history. \
         Respond with a single JSON object with these fields:\n\
         - keyThemes: array of strings\n\
         - technicalAreas: array of {name, count}\n\
         - accomplishments: array of strings\n\
         - commitsByType: array of {type, count, description}\n\
         - timelineHighlights: array of {date (YYYY-MM-DD), description}\n\
         - overallSummary: string\n\n",
    );

    prompt.push_str(&format!("Period: {} to {}\n", range.since, range.until));
    prompt.push_str(&format!("Total commits: {}\n", stats.total_commits));
    prompt.push_str(&format!("Unique authors: {}\n", stats.unique_authors));
    prompt.push_str(&format!("Repositories: {}\n", stats.repositories.join(", ")));
    if !stats.most_active_day.is_empty() {
        prompt.push_str(&format!("Most active day: {}\n", stats.most_active_day));
    }

    let shown = commits.len().min(MAX_PROMPT_COMMITS);
    prompt.push_str(&format!("\nCommits ({shown} of {}):\n", commits.len()));
    for commit in commits.iter().take(MAX_PROMPT_COMMITS) {
        let first_line = commit.message.lines().next().unwrap_or("");
        let message: String = first_line.chars().take(MAX_MESSAGE_CHARS).collect();
        prompt.push_str(&format!(
            "- [{}] {} ({}): {}\n",
            commit.date.format("%Y-%m-%d"),
            commit.repository,
            commit.author.identity(),
            message
        ));
    }

    prompt
}
