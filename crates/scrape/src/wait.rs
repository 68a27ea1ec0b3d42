//! Condition-polling waits. The single wait implementation shared by the
//! readiness gate, the content locator and the table extractor.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::probe::{DomNode, DomScope, PageProbe};

/// Delay between probe attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Poll `poll` until it yields `Some(T)` or `timeout` elapses.
///
/// The condition is checked immediately, so an already-satisfied wait
/// returns without sleeping. On expiry the result is
/// [`ScrapeError::Timeout`] naming `what`; probe errors pass through
/// unchanged.
pub async fn wait_for<T, F, Fut>(
    mut poll: F,
    timeout: Duration,
    what: &str,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ScrapeError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(found) = poll().await? {
            return Ok(found);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                what: what.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
    }
}

/// Wait for an element to appear in `scope`. Expiry maps to
/// [`ScrapeError::ElementNotFound`] so callers can tell a missing element
/// from a readiness timeout.
pub async fn wait_for_element(
    probe: &dyn PageProbe,
    scope: &DomScope,
    selector: &str,
    timeout: Duration,
) -> Result<DomNode, ScrapeError> {
    wait_for(
        || async move { probe.query(scope, selector).await },
        timeout,
        selector,
    )
    .await
    .map_err(|e| match e {
        ScrapeError::Timeout { .. } => ScrapeError::ElementNotFound {
            selector: selector.to_string(),
        },
        other => other,
    })
}
