use std::time::Duration;

pub const DEFAULT_API_PATH: &str = "rest/api/2";
pub const DEFAULT_SESSION_PATH: &str = "rest/auth/1/session";
pub const DEFAULT_USER_AGENT: &str = "jira-toggl";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How the client proves its identity to Jira.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// Log in once through the session resource and replay the cookie.
    #[default]
    Session,
    /// Send `Authorization: Basic` on every request.
    Basic,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Session => "session",
            AuthMethod::Basic => "basic",
        }
    }

    /// Parses a user supplied method name, falling back to session auth.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "basic" => AuthMethod::Basic,
            _ => AuthMethod::Session,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_path: String,
    pub session_path: String,
    pub user_agent: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub auth_method: AuthMethod,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_path: DEFAULT_API_PATH.to_string(),
            session_path: DEFAULT_SESSION_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            auth_method: AuthMethod::default(),
        }
    }

    pub fn with_api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    pub fn with_auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    fn root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn api_root(&self) -> String {
        format!(
            "{}{}/",
            self.root(),
            self.api_path.trim_matches('/')
        )
    }

    pub fn session_url(&self) -> String {
        format!("{}{}", self.root(), self.session_path.trim_matches('/'))
    }
}
