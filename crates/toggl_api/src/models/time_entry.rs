use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Represents a Toggl time entry. An `id` of zero means the entry has not been created yet.
///
/// `duration` is in whole seconds; Toggl reports running entries with a negative value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TimeEntry {
    #[serde(default, skip_serializing_if = "is_unsaved")]
    pub id: u64,
    pub workspace_id: u64,
    #[serde(default)]
    pub project_id: Option<u64>,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub stop: Option<DateTime<Utc>>,
    pub duration: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_with: Option<String>,
}

impl TimeEntry {
    pub fn is_saved(&self) -> bool {
        self.id != 0
    }
}

fn is_unsaved(id: &u64) -> bool {
    *id == 0
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
