//! Console report of a sync run.

use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::logging::{collapse_whitespace, truncate_text};
use crate::marker;
use crate::reconcile::{EntryAction, ReconciliationRecord, SyncedEntry};
use crate::sync::SyncSummary;

const HEADERS: [&str; 7] = ["JIRA", "SUMMARY", "STORY", "START", "HOURS", "ACTION", "MARKER"];
const SUMMARY_WIDTH: usize = 40;

/// Renders one table per record that has entries, then failures and totals.
pub struct Report<'a> {
    summary: &'a SyncSummary,
}

impl<'a> Report<'a> {
    pub fn new(summary: &'a SyncSummary) -> Self {
        Self { summary }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in self.summary.records.iter().filter(|r| !r.entries.is_empty()) {
            writeln!(f, "{}", record_table(record))?;
        }

        for failure in &self.summary.failures {
            writeln!(f, "FAILED {}: {}", failure.key, failure.error)?;
        }

        write!(
            f,
            "{} created, {} updated, {} unchanged, {} failed",
            self.summary.count(EntryAction::Created),
            self.summary.count(EntryAction::Updated),
            self.summary.count(EntryAction::Unchanged),
            self.summary.failures.len()
        )?;
        let would_create = self.summary.count(EntryAction::WouldCreate);
        let would_update = self.summary.count(EntryAction::WouldUpdate);
        if would_create + would_update > 0 {
            write!(f, ", {would_create} would create, {would_update} would update")?;
        }
        writeln!(f)
    }
}

fn record_table(record: &ReconciliationRecord) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADERS.map(|header| Cell::new(header).fg(Color::White)));

    for entry in &record.entries {
        table.add_row(row(record, entry));
    }
    table
}

fn row(record: &ReconciliationRecord, synced: &SyncedEntry) -> [String; 7] {
    let entry = &synced.entry;
    let marker = if entry.is_saved() {
        marker::render(entry.id)
    } else {
        String::new()
    };
    [
        record.subtask.key.clone(),
        truncate_text(&collapse_whitespace(record.subtask.summary()), SUMMARY_WIDTH),
        truncate_text(&collapse_whitespace(record.story.summary()), SUMMARY_WIDTH),
        entry.start.format("%Y-%m-%d").to_string(),
        format!("{:.2}", entry.duration as f64 / 3600.0),
        synced.action.label().to_string(),
        marker,
    ]
}
