//! The `PageProbe` seam between the pipeline and the browser.
//!
//! Document contexts are explicit handles, not ambient driver state: a
//! [`DomScope`] is anything with `querySelector` semantics (the top
//! document, a shadow root, an iframe's content document) and a [`DomNode`]
//! is an element within one. Every scope transition is a function from
//! `(scope, locator)` to a new handle, so "restoring" a context is simply
//! dropping the nested scope — there is no global pointer to reset.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ScrapeError;

/// A queryable document-like root. Backed by a CDP remote object id in
/// production, by a plain label in test stubs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomScope(pub String);

/// An element handle within some scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode(pub String);

/// One table row as read from the page: value-cell texts in column order,
/// plus the href of the anchor inside the first cell (if any).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRow {
    pub cells: Vec<String>,
    pub link: Option<String>,
}

/// Primitive page operations the pipeline is built from.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Point the page at a URL. Render completion is observed separately
    /// by the readiness gate.
    async fn navigate(&self, url: &str) -> Result<(), ScrapeError>;

    /// `window.location.href` of the top document.
    async fn current_url(&self) -> Result<String, ScrapeError>;

    /// `document.readyState` of the top document.
    async fn ready_state(&self) -> Result<String, ScrapeError>;

    /// Handle to the top document.
    async fn root_scope(&self) -> Result<DomScope, ScrapeError>;

    /// First element matching `selector` within `scope`, or `None`.
    async fn query(&self, scope: &DomScope, selector: &str)
        -> Result<Option<DomNode>, ScrapeError>;

    /// The element's shadow root, or `None` if it exposes none.
    async fn shadow_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError>;

    /// An iframe element's content document, or `None` if unavailable.
    async fn frame_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError>;

    /// Read the task table within `scope`: `None` while no `table` element
    /// exists yet, otherwise one [`RawRow`] per `row_selector` match with
    /// cell texts taken from `cell_selector` matches.
    async fn read_rows(
        &self,
        scope: &DomScope,
        row_selector: &str,
        cell_selector: &str,
    ) -> Result<Option<Vec<RawRow>>, ScrapeError>;

    /// Set an input's value, firing input/change events. `false` when no
    /// element matches.
    async fn fill(
        &self,
        scope: &DomScope,
        selector: &str,
        text: &str,
    ) -> Result<bool, ScrapeError>;

    /// Submit the form owning the matched element. `false` when no element
    /// matches or it has no form.
    async fn submit_form(&self, scope: &DomScope, selector: &str) -> Result<bool, ScrapeError>;
}
