//! Config file model, file-backed manager and resolved run settings.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jira_api::{AuthMethod, Url};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::epic::DEFAULT_EPIC_FIELD;
use crate::error::{Result, SyncError};
use crate::secrets::{self, TOGGL_ACCOUNT};

/// `jira` section of the config file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct JiraSection {
    pub host: Option<String>,
    pub user: Option<String>,
    pub query: Option<String>,
    pub epic_field: Option<String>,
    pub auth: Option<String>,
}

/// `toggl` section of the config file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TogglSection {
    pub token: Option<String>,
    pub workspace: Option<u64>,
}

/// Settings persisted on disk. Every field is optional; the command line wins.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub jira: JiraSection,
    pub toggl: TogglSection,
    pub debug: bool,
}

/// Loads the JSON config file from the platform config dir or an explicit path.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager bound to the platform-specific config path.
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "jira-toggl").ok_or_else(|| {
            SyncError::Config("could not determine the config directory; pass --config".into())
        })?;
        Ok(Self::with_path(dirs.config_dir().join("config.json")))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file. A missing file yields defaults, an unreadable or
    /// malformed one is a configuration error.
    pub fn load(&self) -> Result<Config> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content).map_err(|err| {
            SyncError::Config(format!("invalid config file {}: {err}", self.path.display()))
        })
    }
}

/// Everything a sync run needs, merged from flags, environment, config file and keyring.
#[derive(Clone)]
pub struct Settings {
    pub jira_host: String,
    pub user: String,
    pub password: String,
    pub query: String,
    pub auth: AuthMethod,
    pub epic_field: String,
    pub toggl_token: String,
    pub workspace: Option<u64>,
    pub debug: bool,
    pub dry_run: bool,
    pub keep_going: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("jira_host", &self.jira_host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("query", &self.query)
            .field("auth", &self.auth)
            .field("epic_field", &self.epic_field)
            .field("toggl_token", &"<redacted>")
            .field("workspace", &self.workspace)
            .field("debug", &self.debug)
            .field("dry_run", &self.dry_run)
            .field("keep_going", &self.keep_going)
            .finish()
    }
}

impl Settings {
    /// Merges `cli` over `config`; `secret` is asked for a keyring account when
    /// neither source carries the password or the token.
    pub fn resolve<F>(cli: &Cli, config: &Config, mut secret: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let user = pick(&cli.user, &config.jira.user);
        let password = non_empty(&cli.password).or_else(|| {
            user.as_deref()
                .and_then(|user| secret(&secrets::jira_account(user)))
        });
        let toggl_token = pick(&cli.toggl_token, &config.toggl.token)
            .or_else(|| secret(TOGGL_ACCOUNT));
        let auth = pick(&cli.auth, &config.jira.auth)
            .map(|method| AuthMethod::parse(&method))
            .unwrap_or_default();

        let settings = Settings {
            jira_host: pick(&cli.jira_host, &config.jira.host).unwrap_or_default(),
            user: user.unwrap_or_default(),
            password: password.unwrap_or_default(),
            query: pick(&cli.query, &config.jira.query).unwrap_or_default(),
            auth,
            epic_field: pick(&cli.epic_field, &config.jira.epic_field)
                .unwrap_or_else(|| DEFAULT_EPIC_FIELD.to_string()),
            toggl_token: toggl_token.unwrap_or_default(),
            workspace: cli.workspace.or(config.toggl.workspace),
            debug: cli.debug || config.debug,
            dry_run: cli.dry_run,
            keep_going: cli.keep_going,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings a run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.jira_host.is_empty() {
            return Err(SyncError::Config("jira host is required (-j/--jira-host)".into()));
        }
        Url::parse(&self.jira_host).map_err(|err| {
            SyncError::Config(format!("jira host {:?} is not a valid URL: {err}", self.jira_host))
        })?;
        if self.user.is_empty() {
            return Err(SyncError::Config("jira user is required (-u/--user)".into()));
        }
        if self.password.is_empty() {
            return Err(SyncError::Config(
                "jira password is required (-p/--password, JIRA_PASSWORD or keyring)".into(),
            ));
        }
        if self.query.is_empty() {
            return Err(SyncError::Config("jira query is required (-q/--query)".into()));
        }
        if self.toggl_token.is_empty() {
            return Err(SyncError::Config(
                "toggl api token is required (-t/--toggl-token, TOGGL_API or keyring)".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn pick(flag: &Option<String>, file: &Option<String>) -> Option<String> {
    non_empty(flag).or_else(|| non_empty(file))
}
