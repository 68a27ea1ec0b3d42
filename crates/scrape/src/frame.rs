//! Nested content locator: descend through the task-list macroponent's
//! shadow root into the embedded iframe's content document.
//!
//! The descent stays split into phases because each layer fails
//! differently: the macroponent can be absent (page not rendered, wrong
//! page), the shadow root can be missing (markup changed — fatal), and the
//! iframe can lag behind the shadow root (still rendering). Collapsing the
//! phases would lose which layer broke.

use std::time::Duration;

use tracing::debug;

use crate::error::ScrapeError;
use crate::probe::{DomScope, PageProbe};
use crate::wait::wait_for_element;

/// Custom-element tag of the task-list macro-component.
pub const MACROPONENT_TAG: &str = "macroponent-f51912f4c700201072b211d4d8c26010";

/// The task table lives in an iframe inside the macroponent's shadow root.
pub const FRAME_SELECTOR: &str = "iframe";

/// Locate the iframe's content document and return it as a scope.
///
/// Each waiting phase gets the full `timeout` budget. The caller keeps
/// querying the returned scope; dropping it reverts to whatever scope the
/// caller already holds — nothing global changes.
pub async fn enter_task_frame(
    probe: &dyn PageProbe,
    timeout: Duration,
) -> Result<DomScope, ScrapeError> {
    let root = probe.root_scope().await?;

    let host = wait_for_element(probe, &root, MACROPONENT_TAG, timeout).await?;
    debug!("macroponent present");

    let shadow = probe.shadow_scope(&host).await?.ok_or_else(|| {
        ScrapeError::ShadowRootUnavailable {
            element: MACROPONENT_TAG.to_string(),
        }
    })?;

    let iframe = wait_for_element(probe, &shadow, FRAME_SELECTOR, timeout).await?;
    debug!("iframe present in shadow root");

    probe
        .frame_scope(&iframe)
        .await?
        .ok_or_else(|| ScrapeError::ElementNotFound {
            selector: "iframe content document".to_string(),
        })
}
