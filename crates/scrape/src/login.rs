//! Session establisher: fill the login form and submit it.
//!
//! No success verification happens here — the readiness gate observes the
//! post-login URL, so a rejected login simply times out there.

use std::time::Duration;

use tracing::{debug, info};

use snowtask_core::CredentialStore;

use crate::error::ScrapeError;
use crate::probe::PageProbe;
use crate::wait::wait_for_element;

pub const USERNAME_SELECTOR: &str = "#userNameInput";
pub const PASSWORD_SELECTOR: &str = "#passwordInput";

/// Wait for the login form to render, then type `username` and the secret
/// from `credentials` into it and submit the password field's form.
pub async fn submit_login(
    probe: &dyn PageProbe,
    service: &str,
    username: &str,
    credentials: &dyn CredentialStore,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    let secret = credentials
        .lookup(service, username)
        .await
        .map_err(|e| ScrapeError::Credential(e.to_string()))?;

    let root = probe.root_scope().await?;

    // Navigation only queues the load; the form fields appear some time
    // after, so the first fill must not race the render.
    wait_for_element(probe, &root, USERNAME_SELECTOR, timeout).await?;

    debug!(username, "filling login form");
    if !probe.fill(&root, USERNAME_SELECTOR, username).await? {
        return Err(ScrapeError::ElementNotFound {
            selector: USERNAME_SELECTOR.to_string(),
        });
    }
    if !probe.fill(&root, PASSWORD_SELECTOR, secret.expose()).await? {
        return Err(ScrapeError::ElementNotFound {
            selector: PASSWORD_SELECTOR.to_string(),
        });
    }
    if !probe.submit_form(&root, PASSWORD_SELECTOR).await? {
        return Err(ScrapeError::Page(format!(
            "{} has no form to submit",
            PASSWORD_SELECTOR
        )));
    }

    info!(username, "login form submitted");
    Ok(())
}
