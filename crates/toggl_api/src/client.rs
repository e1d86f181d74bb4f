use crate::auth::api_token_credentials;
use crate::config::TogglConfig;
use crate::error::{Result, TogglError};
use crate::models::{Project, TimeEntry};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

#[derive(Clone)]
pub struct TogglClient {
    http: HttpClient,
    config: TogglConfig,
    limiter: RateLimiter,
}

impl TogglClient {
    pub fn new(config: TogglConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.cooldown);
        Self::new_with_limiter(config, limiter)
    }

    pub fn new_with_limiter(config: TogglConfig, limiter: RateLimiter) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &TogglConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Looks a project up by id among the projects visible to the token owner.
    pub async fn get_project(&self, project_id: u64) -> Result<Project> {
        let projects: Vec<Project> = self.send(Method::GET, "me/projects", None::<&Value>).await?;
        projects
            .into_iter()
            .find(|project| project.id == project_id)
            .ok_or_else(|| TogglError::NotFound(format!("project {project_id}")))
    }

    pub async fn get_time_entry(&self, entry_id: u64) -> Result<TimeEntry> {
        let path = format!("me/time_entries/{}", entry_id);
        self.send(Method::GET, &path, None::<&Value>)
            .await
            .map_err(|err| match err {
                TogglError::NotFound(_) => TogglError::NotFound(format!("time entry {entry_id}")),
                other => other,
            })
    }

    pub async fn create_time_entry(&self, entry: &TimeEntry) -> Result<TimeEntry> {
        if entry.is_saved() {
            return Err(TogglError::InvalidEntry(format!(
                "entry {} already exists",
                entry.id
            )));
        }
        let path = format!("workspaces/{}/time_entries", entry.workspace_id);
        self.send(Method::POST, &path, Some(entry)).await
    }

    pub async fn update_time_entry(&self, entry: &TimeEntry) -> Result<TimeEntry> {
        if !entry.is_saved() {
            return Err(TogglError::InvalidEntry(
                "cannot update an entry without an id".to_string(),
            ));
        }
        let path = format!(
            "workspaces/{}/time_entries/{}",
            entry.workspace_id, entry.id
        );
        self.send(Method::PUT, &path, Some(entry)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let waited = self.limiter.hit().await;
        let url = self.url_for(path);
        debug!(%method, %url, waited_ms = waited.as_millis() as u64, "toggl request");
        let mut request = self.http.request(method, url);
        if let Some(payload) = body {
            trace!(body = %serde_json::to_string(payload).unwrap_or_default(), "toggl request body");
            request = request.json(payload);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
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
        trace!(%status, body = %body, "toggl response");
        if status.is_success() {
            serde_json::from_str(&body).map_err(TogglError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(TogglError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else if status == StatusCode::NOT_FOUND {
            Err(TogglError::NotFound(body))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(TogglError::RateLimited(body))
        } else {
            Err(TogglError::http(status, body))
        }
    }
}

fn build_http_client(config: &TogglConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value(api_token_credentials(&config.token))?);
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| TogglError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    let mut header =
        HeaderValue::from_str(&value).map_err(|err| TogglError::Other(err.to_string()))?;
    header.set_sensitive(true);
    Ok(header)
}
