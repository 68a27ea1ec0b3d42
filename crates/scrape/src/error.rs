use std::time::Duration;

use thiserror::Error;

use snowtask_browser::BrowserError;

/// Failures from the scrape pipeline, one variant per diagnosable stage.
///
/// `Timeout` and `ElementNotFound` are both retryable from the caller's
/// point of view but kept distinct: a timeout means a wait condition (URL
/// match, load state) never held, while element-not-found pinpoints which
/// expected node never appeared.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A wait condition was not satisfied within budget.
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    /// An expected element never appeared in its scope.
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    /// The macroponent exposes no shadow root; the UI markup has changed.
    /// Fatal for the run, retrying will not help.
    #[error("element '{element}' exposes no shadow root")]
    ShadowRootUnavailable { element: String },

    /// No table appeared in the frame document within budget.
    #[error("no task table appeared in the frame document")]
    TableNotFound,

    /// Malformed row data. `row` is the zero-based ordinal in document
    /// order; the whole extraction call fails, no partial results.
    #[error("row {row}: {reason}")]
    RowParse { row: usize, reason: String },

    /// The credential store could not produce a secret.
    #[error("credential lookup failed: {0}")]
    Credential(String),

    /// Transport or page-level failure underneath the probe.
    #[error("page error: {0}")]
    Page(String),
}

impl From<BrowserError> for ScrapeError {
    fn from(e: BrowserError) -> Self {
        ScrapeError::Page(e.to_string())
    }
}
