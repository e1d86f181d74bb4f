//! Drives one run: search, walk every story and its subtasks, collect records.

use jira_api::{Issue, JiraClient};
use log::{info, warn};
use toggl_api::Project;

use crate::epic::epic_of;
use crate::error::{Result, SyncError};
use crate::logging::redact_log_details;
use crate::reconcile::{EntryAction, ReconciliationRecord, Reconciler, SyncedEntry};

/// A story that could not be synced in `--keep-going` mode.
#[derive(Debug)]
pub struct IssueFailure {
    pub key: String,
    pub error: SyncError,
}

#[derive(Debug, Default)]
pub struct SyncSummary {
    pub records: Vec<ReconciliationRecord>,
    pub failures: Vec<IssueFailure>,
}

impl SyncSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of synced entries that ended with `action`.
    pub fn count(&self, action: EntryAction) -> usize {
        self.records
            .iter()
            .flat_map(|record| record.entries.iter())
            .filter(|entry| entry.action == action)
            .count()
    }
}

pub struct SyncRun<'a> {
    jira: &'a JiraClient,
    reconciler: Reconciler<'a>,
    epic_field: String,
    keep_going: bool,
}

impl<'a> SyncRun<'a> {
    pub fn new(
        jira: &'a JiraClient,
        reconciler: Reconciler<'a>,
        epic_field: impl Into<String>,
        keep_going: bool,
    ) -> Self {
        Self {
            jira,
            reconciler,
            epic_field: epic_field.into(),
            keep_going,
        }
    }

    /// Syncs every story matched by `query`. Fails on the first error unless
    /// the run keeps going, in which case failures are collected per story.
    pub async fn run(mut self, query: &str) -> Result<SyncSummary> {
        let stories = self.jira.search_issues(query).await?;
        info!("Query matched {} issues", stories.len());

        let mut summary = SyncSummary::default();
        for story in stories {
            if let Err(error) = self.sync_story(&story.key, &mut summary.records).await {
                if !self.keep_going {
                    return Err(error);
                }
                warn!(
                    "Skipping rest of {}: {}",
                    story.key,
                    redact_log_details(&error.to_string())
                );
                summary.failures.push(IssueFailure {
                    key: story.key,
                    error,
                });
            }
        }
        Ok(summary)
    }

    /// Reconciles the story's own worklogs, then those of each subtask.
    ///
    /// Records are pushed as soon as they are produced so entries already
    /// written to Toggl stay in the report when a later subtask fails.
    pub async fn sync_story(
        &mut self,
        key: &str,
        records: &mut Vec<ReconciliationRecord>,
    ) -> Result<()> {
        let story = self.jira.get_issue(key).await?;
        let epic = epic_of(self.jira, &story, &self.epic_field).await?;
        let default_project = self.reconciler.projects().resolve(&epic).await?;

        let entries = self
            .reconciler
            .process_issue(&story, &story, default_project.as_ref())
            .await?;
        records.push(record(&story, story.clone(), &epic, default_project.as_ref(), entries));

        for subtask_ref in story.subtasks() {
            let subtask = self.jira.get_issue(&subtask_ref.key).await?;
            let entries = self
                .reconciler
                .process_issue(&story, &subtask, default_project.as_ref())
                .await?;
            records.push(record(&story, subtask, &epic, default_project.as_ref(), entries));
        }
        Ok(())
    }
}

fn record(
    story: &Issue,
    subtask: Issue,
    epic: &Issue,
    default_project: Option<&Project>,
    entries: Vec<SyncedEntry>,
) -> ReconciliationRecord {
    ReconciliationRecord {
        story: story.clone(),
        subtask,
        epic: epic.clone(),
        default_project: default_project.cloned(),
        entries,
    }
}
