//! Readiness gate: the page counts as loaded only when the browser sits on
//! the expected URL *and* the document reports `readyState == "complete"`.
//! The ticketing UI keeps rendering after navigation, so every later stage
//! runs behind this gate.

use std::time::Duration;

use tracing::debug;

use crate::error::ScrapeError;
use crate::probe::PageProbe;
use crate::wait::wait_for;

/// Block until the page is ready or `timeout` elapses.
///
/// The URL comparison is exact string equality. A differently encoded
/// query string for the same logical filter will never match and the call
/// times out — a known limitation kept on purpose, since normalizing the
/// URL would also mask genuine redirects (e.g. back to the login page).
pub async fn wait_for_page_ready(
    probe: &dyn PageProbe,
    expected_url: &str,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    debug!(expected_url, ?timeout, "waiting for page ready");
    wait_for(
        || async move {
            let url = probe.current_url().await?;
            if url != expected_url {
                return Ok(None);
            }
            let state = probe.ready_state().await?;
            Ok((state == "complete").then_some(()))
        },
        timeout,
        "page ready (url match and document complete)",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubPage, TEST_URL};

    #[tokio::test]
    async fn test_ready_when_both_conditions_hold() {
        let page = StubPage::default();
        wait_for_page_ready(&page, TEST_URL, Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_times_out_when_document_never_completes() {
        let page = StubPage {
            ready: "loading",
            ..StubPage::default()
        };
        let err = wait_for_page_ready(&page, TEST_URL, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_times_out_on_url_mismatch() {
        // Same page, differently encoded query string: exact equality fails.
        let page = StubPage {
            url: format!("{}?sysparm_query=active%3Dtrue", TEST_URL),
            ..StubPage::default()
        };
        let err = wait_for_page_ready(&page, TEST_URL, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { .. }));
    }
}
