//! User models returned by Jira for authors and the session owner.

use serde::Deserialize;

/// Represents a Jira user as embedded in worklogs and returned by `myself`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl User {
    /// Returns the best available login-like identity: name, then email, then account id.
    pub fn identity(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email_address.as_deref())
            .or(self.account_id.as_deref())
            .unwrap_or_default()
    }
}
