//! The worklog comment marker linking a Jira worklog to a Toggl time entry.
//!
//! The marker is a comment line of the form `-----tid:<id>----`. It is written
//! back into the worklog comment by hand after an entry has been created and is
//! the only join key between the two systems.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SyncError};

pub const MARKER_PREFIX: &str = "-----tid:";
pub const MARKER_SUFFIX: &str = "----";

static MARKER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-----tid:([0-9]+)----$").expect("invalid marker regex"));

/// Renders the marker line for a time entry id.
pub fn render(entry_id: u64) -> String {
    format!("{MARKER_PREFIX}{entry_id}{MARKER_SUFFIX}")
}

/// Returns the time entry id carried by `comment`, if any.
///
/// The first line containing the prefix decides. That line, trimmed, must be
/// exactly one well-formed marker; anything else is a malformed marker.
pub fn time_entry_id(comment: &str, worklog: &str) -> Result<Option<u64>> {
    let Some(line) = comment.lines().find(|line| line.contains(MARKER_PREFIX)) else {
        return Ok(None);
    };

    let malformed = || SyncError::MalformedMarker {
        worklog: worklog.to_string(),
        line: line.to_string(),
    };

    let captures = MARKER_TOKEN.captures(line.trim()).ok_or_else(malformed)?;
    captures[1].parse::<u64>().map(Some).map_err(|_| malformed())
}
