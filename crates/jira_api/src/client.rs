use std::collections::HashMap;

use crate::auth::{acquire_session_cookie, basic_credentials};
use crate::config::{AuthMethod, JiraConfig};
use crate::error::{JiraError, Result};
use crate::models::{Issue, IssueRef, SearchResponse, User, WorklogPage};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Fields requested for full issue detail.
const ISSUE_DETAIL_FIELDS: &str = "*all";
/// Search only needs keys; details are fetched per issue.
const SEARCH_FIELDS: &str = "key";

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    credentials: Option<(HeaderName, HeaderValue)>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            credentials: None,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Establishes credentials for every following call.
    ///
    /// Session auth logs in once and replays the cookie; basic auth stores the
    /// header and verifies it against `myself` so bad credentials fail here.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        match self.config.auth_method {
            AuthMethod::Session => {
                let session = acquire_session_cookie(
                    &self.http,
                    &self.config.session_url(),
                    username,
                    password,
                )
                .await?;
                self.credentials = Some((COOKIE, header_value(session.cookie())?));
            }
            AuthMethod::Basic => {
                let value = header_value(basic_credentials(username, password))?;
                self.credentials = Some((AUTHORIZATION, value));
                self.get_myself().await?;
            }
        }
        debug!(user = %username, method = self.config.auth_method.as_str(), "jira authentication succeeded");
        Ok(())
    }

    pub async fn get_myself(&self) -> Result<User> {
        self.get("myself", &[]).await
    }

    /// Runs a JQL search and returns every matching issue reference, following pages.
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<IssueRef>> {
        let page_size = self.config.page_size.to_string();
        let mut issues = Vec::new();
        let mut start_at = 0u32;
        loop {
            let start = start_at.to_string();
            let page: SearchResponse = self
                .get(
                    "search",
                    &[
                        ("jql", jql),
                        ("startAt", start.as_str()),
                        ("maxResults", page_size.as_str()),
                        ("fields", SEARCH_FIELDS),
                    ],
                )
                .await?;
            debug!(start_at, returned = page.issues.len(), total = page.total, "jira search page");
            let next = page.next_start();
            issues.extend(page.issues);
            match next {
                Some(next) => start_at = next,
                None => break,
            }
        }
        Ok(issues)
    }

    /// Fetches full issue detail. Worklogs are completed from the worklog
    /// resource when the embedded page is truncated.
    pub async fn get_issue(&self, issue_key: &str) -> Result<Issue> {
        let path = format!("issue/{}", issue_key);
        let mut issue: Issue = self
            .get(&path, &[("fields", ISSUE_DETAIL_FIELDS)])
            .await
            .map_err(|err| not_found_as_issue(err, issue_key))?;

        let truncated = issue
            .fields
            .worklog
            .as_ref()
            .is_some_and(WorklogPage::is_truncated);
        if truncated {
            debug!(issue = %issue_key, "embedded worklogs truncated, fetching full list");
            issue.fields.worklog = Some(self.get_issue_worklogs(issue_key).await?);
        }
        Ok(issue)
    }

    pub async fn get_issue_worklogs(&self, issue_key: &str) -> Result<WorklogPage> {
        let path = format!("issue/{}/worklog", issue_key);
        self.get(&path, &[])
            .await
            .map_err(|err| not_found_as_issue(err, issue_key))
    }

    /// Returns the issue's `customfield_*` values rendered as text.
    pub async fn get_custom_fields(&self, issue_key: &str) -> Result<HashMap<String, String>> {
        let path = format!("issue/{}", issue_key);
        let issue: Issue = self
            .get(&path, &[("fields", ISSUE_DETAIL_FIELDS)])
            .await
            .map_err(|err| not_found_as_issue(err, issue_key))?;
        Ok(issue.custom_fields())
    }

    async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url_for(path);
        debug!(%method, %url, "jira request");
        let mut request = self.http.request(method, url);
        if let Some((name, value)) = &self.credentials {
            request = request.header(name.clone(), value.clone());
        }
        request
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;
        trace!(%status, body = %body, "jira response");
        if status.is_success() {
            serde_json::from_str(&body).map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else if status == StatusCode::NOT_FOUND {
            Err(JiraError::NotFound(body))
        } else {
            Err(JiraError::http(status, body))
        }
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

fn not_found_as_issue(err: JiraError, issue_key: &str) -> JiraError {
    match err {
        JiraError::NotFound(_) => JiraError::NotFound(issue_key.to_string()),
        other => other,
    }
}
