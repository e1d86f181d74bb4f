use serde::Deserialize;

use crate::models::IssueRef;

/// One page of a JQL search.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<IssueRef>,
}

impl SearchResponse {
    /// Offset of the next page, or `None` when this page is the last one.
    pub fn next_start(&self) -> Option<u32> {
        let next = self.start_at + self.issues.len() as u32;
        (!self.issues.is_empty() && next < self.total).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(start_at: u32, count: usize, total: u32) -> SearchResponse {
        SearchResponse {
            start_at,
            max_results: 2,
            total,
            issues: (0..count)
                .map(|n| IssueRef {
                    key: format!("OPS-{n}"),
                    id: None,
                })
                .collect(),
        }
    }

    #[test]
    fn next_start_advances_until_total() {
        assert_eq!(page(0, 2, 5).next_start(), Some(2));
        assert_eq!(page(4, 1, 5).next_start(), None);
    }

    #[test]
    fn empty_page_stops_paging() {
        assert_eq!(page(0, 0, 5).next_start(), None);
    }
}
