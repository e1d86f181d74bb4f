use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};

use crate::error::{JiraError, Result};
use crate::models::{SessionInfo, SessionRequest, SessionResponse};

/// Logs in through the session resource and returns the cookie Jira issued.
pub async fn acquire_session_cookie(
    http: &Client,
    session_url: &str,
    username: &str,
    password: &str,
) -> Result<SessionInfo> {
    tracing::debug!(url = %session_url, user = %username, "acquiring jira session");
    let response = http
        .post(session_url)
        .json(&SessionRequest { username, password })
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        let body: SessionResponse = response.json().await?;
        Ok(body.session)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(JiraError::Authentication(format!(
            "login rejected for {username} ({status})"
        )))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(JiraError::http(status, body))
    }
}

/// Builds the `Authorization` header value for HTTP basic auth.
pub fn basic_credentials(username: &str, password: &str) -> String {
    let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}
