//! Typed Jira REST client used by the sync tool to read issues and worklogs.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::JiraClient;
pub use config::{AuthMethod, JiraConfig};
pub use error::{JiraError, Result};
pub use models::{Issue, IssueFields, IssueRef, IssueType, SearchResponse, User, Worklog, WorklogPage};
pub use reqwest::Url;
