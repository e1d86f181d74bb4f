//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Mirror Jira worklogs into Toggl time entries
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "jira-toggl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: platform config dir, config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Jira base URL, e.g. https://jira.example.com
    #[arg(short = 'j', long = "jira-host")]
    pub jira_host: Option<String>,

    /// Jira username; also selects whose worklogs are synced
    #[arg(short, long)]
    pub user: Option<String>,

    /// Jira password
    #[arg(short, long, env = "JIRA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// JQL selecting the stories to sync
    #[arg(short, long)]
    pub query: Option<String>,

    /// Jira authentication method (session or basic)
    #[arg(long, value_parser = ["session", "basic"])]
    pub auth: Option<String>,

    /// Custom field holding the epic link
    #[arg(long)]
    pub epic_field: Option<String>,

    /// Toggl API token
    #[arg(short = 't', long = "toggl-token", env = "TOGGL_API", hide_env_values = true)]
    pub toggl_token: Option<String>,

    /// Toggl workspace id overriding the project's workspace
    #[arg(short, long)]
    pub workspace: Option<u64>,

    /// Log every Jira and Toggl request and response
    #[arg(short, long)]
    pub debug: bool,

    /// Compute time entries without writing them to Toggl
    #[arg(long)]
    pub dry_run: bool,

    /// Record failing issues and continue with the next one
    #[arg(long)]
    pub keep_going: bool,
}
