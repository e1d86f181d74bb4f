//! One-way sync of Jira worklogs into Toggl time entries.

use jira_api::{JiraClient, JiraConfig};
use log::{debug, info};
use toggl_api::{TogglClient, TogglConfig};

pub mod cli;
pub mod config;
pub mod epic;
pub mod error;
pub mod logging;
pub mod marker;
pub mod project;
pub mod reconcile;
pub mod report;
pub mod secrets;
pub mod sync;

pub use cli::Cli;
pub use error::{Result, SyncError};
pub use sync::SyncSummary;

use config::{ConfigManager, Settings};
use project::{ProjectCache, ProjectResolver};
use reconcile::{Reconciler, SyncOptions};
use report::Report;
use sync::SyncRun;

/// Loads configuration, syncs every matching story and prints the report.
pub async fn run(cli: Cli) -> Result<SyncSummary> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load()?;
    logging::init(cli.debug || config.debug);
    debug!("Using config file {}", manager.path().display());

    let settings = Settings::resolve(&cli, &config, secrets::lookup)?;
    info!(
        "Syncing worklogs of {} from {}{}",
        settings.user,
        settings.jira_host,
        if settings.dry_run { " (dry run)" } else { "" }
    );

    let mut jira = JiraClient::new(
        JiraConfig::new(&settings.jira_host).with_auth_method(settings.auth.clone()),
    )?;
    jira.authenticate(&settings.user, &settings.password).await?;
    let toggl = TogglClient::new(TogglConfig::new(&settings.toggl_token))?;

    let options = SyncOptions {
        user: settings.user.clone(),
        workspace_override: settings.workspace,
        dry_run: settings.dry_run,
    };
    let reconciler = Reconciler::new(
        &toggl,
        ProjectResolver::new(&toggl, ProjectCache::default()),
        options,
    );
    let summary = SyncRun::new(&jira, reconciler, settings.epic_field.as_str(), settings.keep_going)
        .run(&settings.query)
        .await?;

    print!("{}", Report::new(&summary));
    Ok(summary)
}
