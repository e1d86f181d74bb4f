//! Epic lookup through the epic-link custom field.

use jira_api::{Issue, JiraClient};
use log::debug;

use crate::error::{Result, SyncError};

/// Custom field holding the epic link on the Jira instance the tool was written for.
pub const DEFAULT_EPIC_FIELD: &str = "customfield_10450";

/// Fetches the epic a story belongs to, following the epic-link custom field.
pub async fn epic_of(jira: &JiraClient, issue: &Issue, epic_field: &str) -> Result<Issue> {
    let fields = jira.get_custom_fields(&issue.key).await?;
    let epic_key = fields
        .get(epic_field)
        .ok_or_else(|| SyncError::MissingEpicField {
            issue: issue.key.clone(),
            field: epic_field.to_string(),
        })?;

    debug!("{} belongs to epic {}", issue.key, epic_key);
    Ok(jira.get_issue(epic_key).await?)
}
