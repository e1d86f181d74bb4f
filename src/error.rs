//! Error model for a sync run.

use std::io;

use jira_api::JiraError;
use thiserror::Error;
use toggl_api::TogglError;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Everything that can abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("jira: {0}")]
    Jira(#[from] JiraError),
    #[error("toggl: {0}")]
    Toggl(#[from] TogglError),
    #[error("malformed time entry marker {line:?} in worklog {worklog}")]
    MalformedMarker { worklog: String, line: String },
    #[error("malformed project label {label:?} on {issue}")]
    MalformedProjectLabel { issue: String, label: String },
    #[error("{issue} has no epic link in {field}")]
    MissingEpicField { issue: String, field: String },
    #[error("no toggl project for {issue}: label the subtask, its story or the epic with toggl_proj=<id>")]
    MissingProject { issue: String },
    #[error("keyring error: {0}")]
    Keyring(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl SyncError {
    /// Process exit status for this error: 2 for unusable configuration, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::Config(_) => 2,
            _ => 1,
        }
    }
}
