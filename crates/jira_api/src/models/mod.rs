mod issue;
mod search;
mod session;
mod user;
mod worklog;

pub use issue::{Issue, IssueFields, IssueRef, IssueType};
pub use search::SearchResponse;
pub(crate) use session::SessionRequest;
pub use session::{SessionInfo, SessionResponse};
pub use user::User;
pub use worklog::{parse_jira_datetime, Worklog, WorklogPage};
