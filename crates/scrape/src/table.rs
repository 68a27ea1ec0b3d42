//! Table extractor: rows and fixed-position value cells into [`Task`]s.

use std::time::Duration;

use tracing::debug;

use snowtask_core::task::{parse_opened, Task};

use crate::error::ScrapeError;
use crate::probe::{DomScope, PageProbe, RawRow};
use crate::wait::wait_for;

/// Data rows of the task list.
pub const ROW_SELECTOR: &str = "table tbody tr";

/// Value cells within a row. Column order is fixed by the list view:
/// number, assigned to, state, short description, opened.
pub const CELL_SELECTOR: &str = "td.vt";

/// Number of value cells a well-formed row carries.
const EXPECTED_CELLS: usize = 5;

/// Wait for the table in `scope`, then map every row into a [`Task`].
///
/// All-or-nothing: the first malformed row fails the call with
/// [`ScrapeError::RowParse`] carrying its zero-based ordinal. An empty
/// table yields an empty vec. No retry happens here; the caller decides
/// whether to re-run the pipeline.
pub async fn extract_tasks(
    probe: &dyn PageProbe,
    scope: &DomScope,
    timeout: Duration,
) -> Result<Vec<Task>, ScrapeError> {
    let rows = wait_for(
        || async move { probe.read_rows(scope, ROW_SELECTOR, CELL_SELECTOR).await },
        timeout,
        "task table",
    )
    .await
    .map_err(|e| match e {
        ScrapeError::Timeout { .. } => ScrapeError::TableNotFound,
        other => other,
    })?;

    debug!(rows = rows.len(), "table read");
    rows.iter()
        .enumerate()
        .map(|(ordinal, row)| task_from_row(ordinal, row))
        .collect()
}

/// Convert one raw row into a [`Task`]. Pure; `ordinal` is only used for
/// error reporting.
pub fn task_from_row(ordinal: usize, row: &RawRow) -> Result<Task, ScrapeError> {
    if row.cells.len() < EXPECTED_CELLS {
        return Err(ScrapeError::RowParse {
            row: ordinal,
            reason: format!(
                "expected {} value cells, found {}",
                EXPECTED_CELLS,
                row.cells.len()
            ),
        });
    }

    let number = row.cells[0].trim().to_string();
    if number.is_empty() {
        return Err(ScrapeError::RowParse {
            row: ordinal,
            reason: "empty task number".to_string(),
        });
    }

    let link = row.link.clone().ok_or_else(|| ScrapeError::RowParse {
        row: ordinal,
        reason: "number cell has no anchor".to_string(),
    })?;

    let opened_text = row.cells[4].trim();
    let opened = parse_opened(opened_text).map_err(|e| ScrapeError::RowParse {
        row: ordinal,
        reason: format!("bad opened timestamp '{}': {}", opened_text, e),
    })?;

    Ok(Task {
        number,
        assigned_to: row.cells[1].trim().to_string(),
        state: row.cells[2].trim().to_string(),
        description: row.cells[3].trim().to_string(),
        opened,
        link,
    })
}
