use serde::Deserialize;

/// Represents a Toggl project; only the identifiers matter for placing time entries.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    #[serde(alias = "wid")]
    pub workspace_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}
