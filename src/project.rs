//! Resolution of Jira issues to Toggl projects through `toggl_proj=<id>` labels.

use std::collections::HashMap;

use jira_api::Issue;
use log::debug;
use toggl_api::{Project, TogglClient};

use crate::error::{Result, SyncError};

pub const PROJECT_LABEL: &str = "toggl_proj=";

/// Projects fetched during one run, keyed by Toggl project id.
#[derive(Debug, Default)]
pub struct ProjectCache {
    projects: HashMap<u64, Project>,
}

impl ProjectCache {
    pub fn get(&self, project_id: u64) -> Option<&Project> {
        self.projects.get(&project_id)
    }

    pub fn insert(&mut self, project_id: u64, project: Project) {
        self.projects.insert(project_id, project);
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Looks up the project an issue is labelled with, fetching each project at most once.
pub struct ProjectResolver<'a> {
    toggl: &'a TogglClient,
    cache: ProjectCache,
}

impl<'a> ProjectResolver<'a> {
    pub fn new(toggl: &'a TogglClient, cache: ProjectCache) -> Self {
        Self { toggl, cache }
    }

    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    /// Returns the project named by the issue's first `toggl_proj=` label.
    pub async fn resolve(&mut self, issue: &Issue) -> Result<Option<Project>> {
        let Some(project_id) = project_label_id(&issue.key, issue.labels())? else {
            return Ok(None);
        };

        if let Some(project) = self.cache.get(project_id) {
            return Ok(Some(project.clone()));
        }

        let project = self.toggl.get_project(project_id).await?;
        debug!("Resolved {} to toggl project {}", issue.key, project_id);
        self.cache.insert(project_id, project.clone());
        Ok(Some(project))
    }
}

/// Parses the id out of the first label carrying the project prefix.
pub fn project_label_id(issue_key: &str, labels: &[String]) -> Result<Option<u64>> {
    let Some((label, value)) = labels
        .iter()
        .find_map(|label| label.strip_prefix(PROJECT_LABEL).map(|value| (label, value)))
    else {
        return Ok(None);
    };

    value
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| SyncError::MalformedProjectLabel {
            issue: issue_key.to_string(),
            label: label.clone(),
        })
}
