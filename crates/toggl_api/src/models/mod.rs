mod project;
mod time_entry;

pub use project::Project;
pub use time_entry::TimeEntry;
