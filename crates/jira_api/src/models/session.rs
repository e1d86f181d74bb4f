use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SessionRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body returned by the session resource after a successful login.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionResponse {
    pub session: SessionInfo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionInfo {
    pub name: String,
    pub value: String,
}

impl SessionInfo {
    /// Renders the `Cookie` header value to replay on later requests.
    pub fn cookie(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
