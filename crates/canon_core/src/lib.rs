pub mod issue;
pub mod record;

pub use issue::{sort_issues, Issue, IssueKind, Severity};
pub use record::{Category, Record, Status, Tier};
