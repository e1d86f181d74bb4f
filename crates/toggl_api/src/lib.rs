//! Typed Toggl Track client used by the sync tool to read and write time entries.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::TogglClient;
pub use config::TogglConfig;
pub use error::{Result, TogglError};
pub use models::{Project, TimeEntry};
pub use rate_limiter::RateLimiter;
