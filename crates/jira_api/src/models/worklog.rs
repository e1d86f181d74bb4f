use crate::error::{JiraError, Result};
use crate::models::User;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Timestamp layout Jira uses for `started`, e.g. `2016-04-11T10:00:00.000+0000`.
const JIRA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(rename = "self", default)]
    pub self_url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub comment: Option<String>,
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

impl Worklog {
    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// Author identity used for ownership checks; empty when Jira omits the author.
    pub fn author_identity(&self) -> &str {
        self.author
            .as_ref()
            .map(User::identity)
            .unwrap_or_default()
    }

    pub fn started_at(&self) -> Result<DateTime<Utc>> {
        parse_jira_datetime(&self.started)
    }
}

/// Page of worklogs, either embedded in an issue or returned by the worklog resource.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

impl WorklogPage {
    /// Jira embeds only the first worklogs of an issue; the rest must be fetched separately.
    pub fn is_truncated(&self) -> bool {
        (self.worklogs.len() as u32) < self.total
    }
}

/// Parses Jira timestamps, accepting RFC 3339 as well as Jira's `+0000` offset style.
pub fn parse_jira_datetime(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, JIRA_TIMESTAMP_FORMAT))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| JiraError::Timestamp {
            value: value.to_string(),
        })
}
