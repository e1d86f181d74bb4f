//! OS keyring fallback for the Jira password and the Toggl token.

use keyring::{Entry, Error as KeyringError};
use log::debug;

use crate::error::{Result, SyncError};
use crate::logging::redact_log_details;

pub const KEYRING_SERVICE: &str = "jira-toggl";
pub const TOGGL_ACCOUNT: &str = "toggl";

/// Keyring account holding the Jira password of `user`.
pub fn jira_account(user: &str) -> String {
    format!("jira:{}", user.trim())
}

/// Reads a stored secret. A missing entry is `Ok(None)`.
pub fn read_secret(account: &str) -> Result<Option<String>> {
    let entry = Entry::new(KEYRING_SERVICE, account)
        .map_err(|err| SyncError::Keyring(format!("failed to open keyring entry: {err}")))?;
    match entry.get_password() {
        Ok(secret) if secret.trim().is_empty() => Ok(None),
        Ok(secret) => Ok(Some(secret)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(err) => Err(SyncError::Keyring(format!(
            "failed to read {account} from keyring: {err}"
        ))),
    }
}

/// Keyring lookup used while resolving settings; failures count as a miss.
pub fn lookup(account: &str) -> Option<String> {
    match read_secret(account) {
        Ok(secret) => {
            debug!(
                "Keyring {} for {account}",
                if secret.is_some() { "hit" } else { "miss" }
            );
            secret
        }
        Err(err) => {
            debug!("Keyring lookup skipped: {}", redact_log_details(&err.to_string()));
            None
        }
    }
}
