//! The scrape pipeline: login, readiness gate, shadow/iframe descent, and
//! table extraction for a ServiceNow-style task list.
//!
//! Stages run strictly in sequence and all share one timeout budget:
//!
//! 1. [`login::submit_login`] — fill the credential form and submit.
//! 2. [`ready::wait_for_page_ready`] — URL equality + `document.readyState`.
//! 3. [`frame::enter_task_frame`] — macroponent shadow root, then the
//!    embedded iframe's content document.
//! 4. [`table::extract_tasks`] — rows and cells into [`snowtask_core::Task`].
//!
//! Document contexts are explicit [`probe::DomScope`] values threaded
//! through calls, never driver-global state; dropping a scope is the
//! "switch back" operation. All waits poll through [`wait::wait_for`].
//! [`cdp_page::CdpPage`] is the production [`probe::PageProbe`]; tests run
//! the same pipeline against in-memory stubs.

pub mod cdp_page;
pub mod error;
pub mod frame;
pub mod login;
pub mod pipeline;
pub mod probe;
pub mod ready;
pub mod table;
pub mod wait;

#[cfg(test)]
pub(crate) mod testutil;

pub use cdp_page::CdpPage;
pub use error::ScrapeError;
pub use pipeline::fetch_tasks;
pub use probe::{DomNode, DomScope, PageProbe, RawRow};
