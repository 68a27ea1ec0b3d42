//! The `Task` record extracted from one row of the ticketing table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Textual format of the "Opened" column, e.g. `03/14/2024 09:15:00 AM`.
pub const OPENED_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// One ticket row. Constructed once during extraction, immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Ticket key, e.g. "INC0012345". Non-empty.
    pub number: String,
    /// Assignee name; empty when unassigned.
    pub assigned_to: String,
    /// Workflow state label.
    pub state: String,
    /// Short description; may be empty.
    pub description: String,
    /// Creation timestamp, parsed from [`OPENED_FORMAT`].
    pub opened: NaiveDateTime,
    /// Absolute URL of the ticket detail page.
    pub link: String,
}

/// Parse the "Opened" cell text. Whitespace around the value is ignored.
pub fn parse_opened(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), OPENED_FORMAT)
}
