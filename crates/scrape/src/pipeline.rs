//! Pipeline orchestration: navigate → login → ready gate → frame descent →
//! table extraction, strictly in that order.

use tracing::{debug, info};

use snowtask_core::{Config, CredentialStore, Task};

use crate::error::ScrapeError;
use crate::frame::enter_task_frame;
use crate::login::submit_login;
use crate::probe::PageProbe;
use crate::ready::wait_for_page_ready;
use crate::table::extract_tasks;

/// Run the whole scrape against an already-connected page.
///
/// Stage errors propagate as-is; nothing is retried. The browser session
/// is owned by the caller, which must close it on every exit path.
pub async fn fetch_tasks(
    probe: &dyn PageProbe,
    config: &Config,
    credentials: &dyn CredentialStore,
) -> Result<Vec<Task>, ScrapeError> {
    let timeout = config.timeout();

    info!(url = %config.url, "opening task list");
    probe.navigate(&config.url).await?;

    submit_login(probe, &config.service, &config.username, credentials, timeout).await?;

    wait_for_page_ready(probe, &config.url, timeout).await?;
    debug!("page ready, descending into task frame");

    let frame = enter_task_frame(probe, timeout).await?;
    let tasks = extract_tasks(probe, &frame, timeout).await?;

    info!(count = tasks.len(), "tasks extracted");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{incident_row, StubPage, TEST_URL};
    use async_trait::async_trait;
    use snowtask_core::{credentials::Secret, Error, StaticCredentials};

    fn test_config() -> Config {
        Config {
            url: TEST_URL.to_string(),
            username: "a.user".to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_over_stub() {
        let page = StubPage {
            rows: Some(vec![incident_row()]),
            ..StubPage::default()
        };
        let creds = StaticCredentials::new("pw");

        let tasks = fetch_tasks(&page, &test_config(), &creds).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].number, "INC0012345");
        assert_eq!(tasks[0].link, "https://example/inc/12345");

        // Stage ordering side effects: navigation happened, both login
        // fields were filled, the form was submitted.
        assert_eq!(*page.navigations.lock().unwrap(), vec![TEST_URL.to_string()]);
        assert_eq!(page.fills.lock().unwrap().len(), 2);
        assert_eq!(page.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_form_rendering_late_still_succeeds() {
        // Navigation returns before the login page has rendered; the run
        // must wait for the form within the configured budget, not abort
        // on the first missed selector.
        let page = StubPage {
            login_delay: std::time::Duration::from_millis(300),
            rows: Some(vec![incident_row()]),
            ..StubPage::default()
        };
        let creds = StaticCredentials::new("pw");

        let tasks = fetch_tasks(&page, &test_config(), &creds).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(page.fills.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_credential_failure_stops_before_navigation_completes_login() {
        struct NoCreds;

        #[async_trait]
        impl CredentialStore for NoCreds {
            async fn lookup(&self, _s: &str, _u: &str) -> snowtask_core::Result<Secret> {
                Err(Error::Credential("store empty".into()))
            }
        }

        let page = StubPage::default();
        let err = fetch_tasks(&page, &test_config(), &NoCreds).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Credential(_)));
        // Nothing was typed into the page.
        assert!(page.fills.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_never_ready_surfaces_timeout() {
        let page = StubPage {
            ready: "interactive",
            rows: Some(vec![incident_row()]),
            ..StubPage::default()
        };
        let mut config = test_config();
        config.timeout_ms = 50;
        let creds = StaticCredentials::new("pw");
        let err = fetch_tasks(&page, &config, &creds).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { .. }));
    }
}
