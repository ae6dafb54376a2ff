use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    pub name: String,
    pub owner: String,
    pub default_branch: String,
    pub private: bool,
    pub html_url: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub id: u64,
    pub account: Option<InstallationAccount>,
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationAccount {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub avatar_url: Option<String>,
}
