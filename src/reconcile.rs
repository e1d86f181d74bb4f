//! Reconciliation of Jira worklogs with Toggl time entries.
//!
//! Every worklog authored by the configured user maps to exactly one time
//! entry. The worklog comment carries the entry id (see [`crate::marker`]);
//! without it a new entry is created, with it the remote entry is compared
//! and rewritten only when its start or duration drifted.

use chrono::{DateTime, Duration, Utc};
use jira_api::{Issue, Worklog};
use log::{debug, info};
use toggl_api::{Project, TimeEntry, TogglClient};

use crate::error::{Result, SyncError};
use crate::marker;
use crate::project::ProjectResolver;

pub const TAG_LABEL: &str = "toggl_tag=";
const TAG_PREFIX: &str = "INT_";

/// Run-wide knobs of the engine.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Worklogs whose author identity contains this string are synced.
    pub user: String,
    /// Replaces the project's workspace on every built entry.
    pub workspace_override: Option<u64>,
    /// Compute entries without writing them.
    pub dry_run: bool,
}

/// What happened to a worklog's time entry during this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Unchanged,
    Created,
    Updated,
    WouldCreate,
    WouldUpdate,
}

impl EntryAction {
    pub fn label(&self) -> &'static str {
        match self {
            EntryAction::Unchanged => "unchanged",
            EntryAction::Created => "created",
            EntryAction::Updated => "updated",
            EntryAction::WouldCreate => "would create",
            EntryAction::WouldUpdate => "would update",
        }
    }
}

/// A worklog together with the time entry it ended up as.
#[derive(Debug, Clone)]
pub struct SyncedEntry {
    pub worklog: Worklog,
    pub entry: TimeEntry,
    pub action: EntryAction,
}

/// The outcome of reconciling one subtask (or the story itself) of a story.
#[derive(Debug, Clone)]
pub struct ReconciliationRecord {
    pub story: Issue,
    pub subtask: Issue,
    pub epic: Issue,
    pub default_project: Option<Project>,
    pub entries: Vec<SyncedEntry>,
}

enum Plan {
    Keep(TimeEntry),
    Create(TimeEntry),
    Update(TimeEntry),
}

pub struct Reconciler<'a> {
    toggl: &'a TogglClient,
    projects: ProjectResolver<'a>,
    options: SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(toggl: &'a TogglClient, projects: ProjectResolver<'a>, options: SyncOptions) -> Self {
        Self {
            toggl,
            projects,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn projects(&mut self) -> &mut ProjectResolver<'a> {
        &mut self.projects
    }

    /// Upserts one time entry per worklog of `subtask` owned by the configured user.
    ///
    /// `story` supplies the description, the default tag and the second step of
    /// the project fallback; `default_project` comes from the story's epic.
    pub async fn process_issue(
        &mut self,
        story: &Issue,
        subtask: &Issue,
        default_project: Option<&Project>,
    ) -> Result<Vec<SyncedEntry>> {
        let owned: Vec<&Worklog> = subtask
            .worklogs()
            .iter()
            .filter(|worklog| worklog.author_identity().contains(&self.options.user))
            .collect();
        if owned.is_empty() {
            return Ok(Vec::new());
        }

        info!("Processing {} ({} worklogs)", subtask.key, owned.len());
        let project = self.project_for(story, subtask, default_project).await?;

        let mut synced = Vec::with_capacity(owned.len());
        for worklog in owned {
            let plan = self.plan(worklog, story, subtask, project.as_ref()).await?;
            let (entry, action) = self.apply(plan).await?;
            debug!("{} {} -> {} ({})", subtask.key, worklog.self_url, entry.id, action.label());
            synced.push(SyncedEntry {
                worklog: worklog.clone(),
                entry,
                action,
            });
        }
        Ok(synced)
    }

    /// Subtask label, then story label, then the epic default.
    async fn project_for(
        &mut self,
        story: &Issue,
        subtask: &Issue,
        default_project: Option<&Project>,
    ) -> Result<Option<Project>> {
        if let Some(project) = self.projects.resolve(subtask).await? {
            return Ok(Some(project));
        }
        if let Some(project) = self.projects.resolve(story).await? {
            return Ok(Some(project));
        }
        Ok(default_project.cloned())
    }

    async fn plan(
        &self,
        worklog: &Worklog,
        story: &Issue,
        subtask: &Issue,
        project: Option<&Project>,
    ) -> Result<Plan> {
        let Some(entry_id) = marker::time_entry_id(worklog.comment(), &worklog.self_url)? else {
            let entry = build_entry(worklog, story, subtask, project, &self.options)?;
            return Ok(Plan::Create(entry));
        };

        let remote = self.toggl.get_time_entry(entry_id).await?;
        let started = worklog.started_at()?;
        if !has_drifted(started, worklog.time_spent_seconds, &remote) {
            return Ok(Plan::Keep(remote));
        }

        debug!(
            "Entry {} drifted: {}s at {} in toggl, {}s at {} in jira",
            entry_id, remote.duration, remote.start, worklog.time_spent_seconds, started
        );
        let mut entry = build_entry(worklog, story, subtask, project, &self.options)?;
        entry.id = entry_id;
        Ok(Plan::Update(entry))
    }

    async fn apply(&self, plan: Plan) -> Result<(TimeEntry, EntryAction)> {
        let dry_run = self.options.dry_run;
        let applied = match plan {
            Plan::Keep(entry) => (entry, EntryAction::Unchanged),
            Plan::Create(entry) if dry_run => (entry, EntryAction::WouldCreate),
            Plan::Update(entry) if dry_run => (entry, EntryAction::WouldUpdate),
            Plan::Create(entry) => {
                info!("Creating time entry: {}", entry.description);
                (self.toggl.create_time_entry(&entry).await?, EntryAction::Created)
            }
            Plan::Update(entry) => {
                info!("Updating time entry {}: {}", entry.id, entry.description);
                (self.toggl.update_time_entry(&entry).await?, EntryAction::Updated)
            }
        };
        Ok(applied)
    }
}

/// An entry drifted when Jira's duration or start differs from Toggl's.
pub fn has_drifted(started: DateTime<Utc>, seconds: i64, remote: &TimeEntry) -> bool {
    remote.duration != seconds || remote.start != started
}

/// Builds a fresh (unsaved) entry from the worklog and its issues.
pub fn build_entry(
    worklog: &Worklog,
    story: &Issue,
    subtask: &Issue,
    project: Option<&Project>,
    options: &SyncOptions,
) -> Result<TimeEntry> {
    let project = project.ok_or_else(|| SyncError::MissingProject {
        issue: subtask.key.clone(),
    })?;
    let start = worklog.started_at()?;
    let duration = worklog.time_spent_seconds;

    Ok(TimeEntry {
        id: 0,
        workspace_id: options.workspace_override.unwrap_or(project.workspace_id),
        project_id: Some(project.id),
        start,
        stop: Some(start + Duration::seconds(duration)),
        duration,
        description: format!("{} - {}", subtask.key, story.summary()),
        tags: entry_tags(story.issue_type_name(), subtask.labels()),
        created_with: Some(worklog.self_url.clone()),
    })
}

/// The single tag of an entry: the subtask's first `toggl_tag=` label, or one
/// derived from the story's issue type.
pub fn entry_tags(issue_type: &str, subtask_labels: &[String]) -> Vec<String> {
    let tag = subtask_labels
        .iter()
        .filter_map(|label| label.strip_prefix(TAG_LABEL))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_tag(issue_type));
    vec![tag]
}

fn default_tag(issue_type: &str) -> String {
    format!("{TAG_PREFIX}{issue_type}").replacen("INT_Story", "INT_Development", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectCache;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use toggl_api::{RateLimiter, TogglConfig};

    const STARTED: &str = "2016-04-11T10:00:00.000+0000";
    const SELF_URL: &str = "https://jira.example.com/rest/api/2/issue/10010/worklog/10000";

    fn worklog(author: &str, comment: &str, seconds: i64) -> Value {
        json!({
            "self": SELF_URL,
            "author": {"name": author},
            "comment": comment,
            "started": STARTED,
            "timeSpentSeconds": seconds
        })
    }

    fn issue(key: &str, issue_type: &str, labels: &[&str], worklogs: Vec<Value>) -> Issue {
        serde_json::from_value(json!({
            "key": key,
            "fields": {
                "summary": format!("{key} summary"),
                "issuetype": {"name": issue_type},
                "labels": labels,
                "worklog": {"startAt": 0, "maxResults": 20, "total": worklogs.len(), "worklogs": worklogs}
            }
        }))
        .expect("issue")
    }

    fn story() -> Issue {
        issue("OPS-1", "Story", &[], Vec::new())
    }

    fn default_project() -> Project {
        Project {
            id: 12,
            workspace_id: 777,
            name: None,
            active: None,
        }
    }

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 4, 11, 10, 0, 0).unwrap()
    }

    fn options(dry_run: bool) -> SyncOptions {
        SyncOptions {
            user: "jdoe".to_string(),
            workspace_override: None,
            dry_run,
        }
    }

    fn toggl_for(server: &Server) -> TogglClient {
        TogglClient::new_with_limiter(
            TogglConfig::new("token").with_base_url(server.url()),
            RateLimiter::unlimited(),
        )
        .expect("client")
    }

    async fn remote_entry(server: &mut Server, id: u64, seconds: i64) -> mockito::Mock {
        server
            .mock("GET", format!("/api/v9/me/time_entries/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": id,
                    "workspace_id": 777,
                    "project_id": 12,
                    "start": "2016-04-11T10:00:00Z",
                    "duration": seconds,
                    "description": "old description",
                    "tags": ["INT_Development"]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await
    }

    async fn writes(server: &mut Server, creates: usize, updates: usize) -> (mockito::Mock, mockito::Mock) {
        let create = server
            .mock("POST", Matcher::Regex(r"^/api/v9/workspaces/\d+/time_entries$".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":501,"workspace_id":777,"project_id":12,"start":"2016-04-11T10:00:00Z","duration":3600}"#)
            .expect(creates)
            .create_async()
            .await;
        let update = server
            .mock("PUT", Matcher::Regex(r"^/api/v9/workspaces/\d+/time_entries/\d+$".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"workspace_id":777,"project_id":12,"start":"2016-04-11T10:00:00Z","duration":3600}"#)
            .expect(updates)
            .create_async()
            .await;
        (create, update)
    }

    async fn run(
        server: &Server,
        story: &Issue,
        subtask: &Issue,
        default: Option<&Project>,
        options: SyncOptions,
    ) -> Result<Vec<SyncedEntry>> {
        let toggl = toggl_for(server);
        let resolver = ProjectResolver::new(&toggl, ProjectCache::default());
        let mut reconciler = Reconciler::new(&toggl, resolver, options);
        reconciler.process_issue(story, subtask, default).await
    }

    #[tokio::test]
    async fn matching_entry_is_left_alone() {
        let mut server = Server::new_async().await;
        let fetched = remote_entry(&mut server, 42, 3600).await;
        let (create, update) = writes(&mut server, 0, 0).await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "-----tid:42----", 3600)]);

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .expect("sync");

        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].action, EntryAction::Unchanged);
        assert_eq!(synced[0].entry.id, 42);
        assert_eq!(synced[0].entry.description, "old description");
        fetched.assert_async().await;
        create.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn worklog_without_marker_creates_an_entry() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/v9/workspaces/777/time_entries")
            .match_body(Matcher::PartialJson(json!({
                "workspace_id": 777,
                "project_id": 12,
                "start": "2016-04-11T10:00:00Z",
                "stop": "2016-04-11T11:00:00Z",
                "duration": 3600,
                "description": "OPS-2 - OPS-1 summary",
                "tags": ["INT_Development"],
                "created_with": SELF_URL
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":501,"workspace_id":777,"project_id":12,"start":"2016-04-11T10:00:00Z","duration":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "wrote tests", 3600)]);

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .expect("sync");

        assert_eq!(synced[0].action, EntryAction::Created);
        assert_eq!(synced[0].entry.id, 501);
        create.assert_async().await;
    }

    #[tokio::test]
    async fn drifted_entry_is_updated_in_place() {
        let mut server = Server::new_async().await;
        let fetched = remote_entry(&mut server, 42, 1800).await;
        let update = server
            .mock("PUT", "/api/v9/workspaces/777/time_entries/42")
            .match_body(Matcher::PartialJson(json!({
                "id": 42,
                "duration": 3600,
                "start": "2016-04-11T10:00:00Z",
                "description": "OPS-2 - OPS-1 summary",
                "tags": ["INT_Development"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"workspace_id":777,"project_id":12,"start":"2016-04-11T10:00:00Z","duration":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let create = server.mock("POST", Matcher::Any).expect(0).create_async().await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "-----tid:42----", 3600)]);

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .expect("sync");

        assert_eq!(synced[0].action, EntryAction::Updated);
        assert_eq!(synced[0].entry.id, 42);
        assert_eq!(synced[0].entry.duration, 3600);
        fetched.assert_async().await;
        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn other_authors_are_skipped_entirely() {
        let mut server = Server::new_async().await;
        let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;
        let (create, update) = writes(&mut server, 0, 0).await;
        let subtask = issue(
            "OPS-2",
            "Sub-task",
            &["toggl_proj=12"],
            vec![worklog("asmith", "-----tid:42----", 3600), worklog("asmith", "", 60)],
        );

        let synced = run(&server, &story(), &subtask, None, options(false)).await.expect("sync");

        assert!(synced.is_empty());
        any.assert_async().await;
        create.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn author_match_is_a_substring_test() {
        let mut server = Server::new_async().await;
        let (create, _update) = writes(&mut server, 1, 0).await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe@example.com", "", 3600)]);

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .expect("sync");

        assert_eq!(synced.len(), 1);
        create.assert_async().await;
    }

    #[tokio::test]
    async fn dry_run_never_writes() {
        let mut server = Server::new_async().await;
        let fetched = remote_entry(&mut server, 42, 1800).await;
        let (create, update) = writes(&mut server, 0, 0).await;
        let subtask = issue(
            "OPS-2",
            "Sub-task",
            &[],
            vec![worklog("jdoe", "-----tid:42----", 3600), worklog("jdoe", "no marker", 900)],
        );

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(true))
            .await
            .expect("sync");

        assert_eq!(synced.len(), 2);
        assert_eq!(synced[0].action, EntryAction::WouldUpdate);
        assert_eq!(synced[0].entry.id, 42);
        assert_eq!(synced[0].entry.duration, 3600);
        assert_eq!(synced[1].action, EntryAction::WouldCreate);
        assert_eq!(synced[1].entry.id, 0);
        assert_eq!(synced[1].entry.duration, 900);
        fetched.assert_async().await;
        create.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn story_project_is_used_when_subtask_has_none() {
        let mut server = Server::new_async().await;
        let projects = server
            .mock("GET", "/api/v9/me/projects")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":34,"workspace_id":888}]"#)
            .expect(1)
            .create_async()
            .await;
        let story = issue("OPS-1", "Story", &["toggl_proj=34"], Vec::new());
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "", 60)]);

        let synced = run(&server, &story, &subtask, Some(&default_project()), options(true))
            .await
            .expect("sync");

        assert_eq!(synced[0].entry.project_id, Some(34));
        assert_eq!(synced[0].entry.workspace_id, 888);
        projects.assert_async().await;
    }

    #[tokio::test]
    async fn epic_default_is_used_when_nothing_is_labelled() {
        let server = Server::new_async().await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "", 60)]);

        let synced = run(&server, &story(), &subtask, Some(&default_project()), options(true))
            .await
            .expect("sync");

        assert_eq!(synced[0].entry.project_id, Some(12));
        assert_eq!(synced[0].entry.workspace_id, 777);
    }

    #[tokio::test]
    async fn missing_project_aborts() {
        let server = Server::new_async().await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "", 60)]);

        let err = run(&server, &story(), &subtask, None, options(true)).await.unwrap_err();

        assert!(matches!(err, SyncError::MissingProject { ref issue } if issue == "OPS-2"));
    }

    #[tokio::test]
    async fn malformed_marker_aborts_before_any_request() {
        let mut server = Server::new_async().await;
        let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "-----tid:4x2----", 60)]);

        let err = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::MalformedMarker { .. }));
        any.assert_async().await;
    }

    #[tokio::test]
    async fn transport_errors_abort() {
        let mut server = Server::new_async().await;
        let _failing = server
            .mock("POST", "/api/v9/workspaces/777/time_entries")
            .with_status(500)
            .create_async()
            .await;
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "", 60)]);

        let err = run(&server, &story(), &subtask, Some(&default_project()), options(false))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Toggl(_)));
    }

    #[test]
    fn tag_label_overrides_type_tag() {
        let labels = vec!["backend".to_string(), "toggl_tag=Meetings".to_string()];
        assert_eq!(entry_tags("Story", &labels), vec!["Meetings".to_string()]);
    }

    #[test]
    fn first_tag_label_wins() {
        let labels = vec!["toggl_tag=Meetings".to_string(), "toggl_tag=Support".to_string()];
        assert_eq!(entry_tags("Bug", &labels), vec!["Meetings".to_string()]);
    }

    #[test]
    fn story_type_maps_to_development_tag() {
        assert_eq!(entry_tags("Story", &[]), vec!["INT_Development".to_string()]);
        assert_eq!(entry_tags("Bug", &[]), vec!["INT_Bug".to_string()]);
        assert_eq!(entry_tags("Bug", &["toggl_tag=".to_string()]), vec!["INT_Bug".to_string()]);
    }

    #[test]
    fn workspace_override_replaces_project_workspace() {
        let subtask = issue("OPS-2", "Sub-task", &[], vec![worklog("jdoe", "", 5400)]);
        let options = SyncOptions {
            workspace_override: Some(999),
            ..options(false)
        };

        let entry = build_entry(
            &subtask.worklogs()[0],
            &story(),
            &subtask,
            Some(&default_project()),
            &options,
        )
        .expect("entry");

        assert_eq!(entry.id, 0);
        assert_eq!(entry.workspace_id, 999);
        assert_eq!(entry.project_id, Some(12));
        assert_eq!(entry.start, started());
        assert_eq!(entry.stop, Some(started() + Duration::seconds(5400)));
        assert_eq!(entry.created_with.as_deref(), Some(SELF_URL));
    }

    #[test]
    fn drift_compares_duration_and_start_exactly() {
        let remote = TimeEntry {
            id: 42,
            workspace_id: 777,
            start: started(),
            duration: 3600,
            ..TimeEntry::default()
        };

        assert!(!has_drifted(started(), 3600, &remote));
        assert!(has_drifted(started(), 3601, &remote));
        assert!(has_drifted(started() + Duration::seconds(1), 3600, &remote));
    }
}
