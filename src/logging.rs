//! Logger setup and helpers that keep secrets and noise out of log lines.

const DEFAULT_FILTER: &str = "info";
const DEBUG_FILTER: &str = "info,jira_toggl=debug,jira_api=trace,toggl_api=trace";

/// Installs `env_logger`. `RUST_LOG` still wins over the built-in filters.
pub fn init(debug: bool) {
    let filter = if debug { DEBUG_FILTER } else { DEFAULT_FILTER };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init();
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate_text(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    if limit <= 1 {
        return "…".to_string();
    }
    let mut truncated: String = trimmed.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}

/// Shortens an error message for logging, hiding it entirely when it looks
/// like it carries credentials.
pub fn redact_log_details(value: &str) -> String {
    let collapsed = collapse_whitespace(value);
    let category = collapsed
        .split(':')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .unwrap_or("error");
    let lowered = collapsed.to_lowercase();
    let sensitive = [
        "api_token",
        "token",
        "authorization",
        "basic ",
        "password",
        "jsessionid",
        "cookie",
    ]
    .iter()
    .any(|hint| lowered.contains(hint));

    if sensitive {
        return format!("{}: <redacted-sensitive-details>", truncate_text(category, 64));
    }

    truncate_text(&collapsed, 180)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_text("  abcdef  ", 4), "abc…");
        assert_eq!(truncate_text("abc", 4), "abc");
        assert_eq!(truncate_text("abc", 1), "…");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(collapse_whitespace("a \n\t b  c"), "a b c");
    }

    #[test]
    fn credentials_are_redacted() {
        assert_eq!(
            redact_log_details("jira: authentication failed: password rejected"),
            "jira: <redacted-sensitive-details>"
        );
        assert_eq!(
            redact_log_details("toggl: resource not found:   time entry 42"),
            "toggl: resource not found: time entry 42"
        );
    }
}
