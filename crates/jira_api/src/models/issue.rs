use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::WorklogPage;

const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Lightweight issue reference as returned by search results and sub-task lists.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueRef {
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<IssueType>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<IssueRef>,
    #[serde(default)]
    pub worklog: Option<WorklogPage>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

impl Issue {
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    pub fn issue_type_name(&self) -> &str {
        self.fields
            .issue_type
            .as_ref()
            .map(|issue_type| issue_type.name.as_str())
            .unwrap_or_default()
    }

    pub fn labels(&self) -> &[String] {
        &self.fields.labels
    }

    pub fn subtasks(&self) -> &[IssueRef] {
        &self.fields.subtasks
    }

    pub fn worklogs(&self) -> &[crate::models::Worklog] {
        self.fields
            .worklog
            .as_ref()
            .map(|page| page.worklogs.as_slice())
            .unwrap_or_default()
    }

    /// Returns the `customfield_*` values that can be rendered as text.
    ///
    /// Strings and numbers are taken as is; option objects contribute their
    /// `value`, `key` or `name` member, in that order.
    pub fn custom_fields(&self) -> HashMap<String, String> {
        self.fields
            .extra
            .iter()
            .filter(|(name, _)| name.starts_with(CUSTOM_FIELD_PREFIX))
            .filter_map(|(name, value)| custom_field_text(value).map(|text| (name.clone(), text)))
            .collect()
    }
}

fn custom_field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => ["value", "key", "name"]
            .iter()
            .find_map(|member| map.get(*member))
            .and_then(custom_field_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_fields_keep_only_textual_customfield_values() {
        let issue: Issue = serde_json::from_value(json!({
            "key": "OPS-1",
            "fields": {
                "summary": "Story",
                "labels": ["toggl_proj=12"],
                "customfield_10450": "OPS-0",
                "customfield_10001": 3,
                "customfield_10002": {"value": "High"},
                "customfield_10003": null,
                "customfield_10004": "  ",
                "created": "2016-04-11T10:00:00.000+0000"
            }
        }))
        .expect("issue should decode");

        let fields = issue.custom_fields();
        assert_eq!(fields.get("customfield_10450").map(String::as_str), Some("OPS-0"));
        assert_eq!(fields.get("customfield_10001").map(String::as_str), Some("3"));
        assert_eq!(fields.get("customfield_10002").map(String::as_str), Some("High"));
        assert!(!fields.contains_key("customfield_10003"));
        assert!(!fields.contains_key("customfield_10004"));
        assert!(!fields.contains_key("created"));
    }

    #[test]
    fn missing_fields_fall_back_to_empty_values() {
        let issue: Issue = serde_json::from_value(json!({"key": "OPS-2"})).expect("decode");
        assert_eq!(issue.summary(), "");
        assert_eq!(issue.issue_type_name(), "");
        assert!(issue.labels().is_empty());
        assert!(issue.subtasks().is_empty());
        assert!(issue.worklogs().is_empty());
    }
}
