//! `PageProbe` backed by a live CDP connection.
//!
//! Scope and node handles wrap Runtime remote object ids. All DOM work
//! happens via `Runtime.callFunctionOn` with `this` bound to the handle, so
//! the same snippets work against the top document, shadow roots and iframe
//! content documents alike.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::trace;

use snowtask_browser::cdp::{result_object_id, result_value};
use snowtask_browser::CdpClient;

use crate::error::ScrapeError;
use crate::probe::{DomNode, DomScope, PageProbe, RawRow};

const QUERY_JS: &str = "function(sel) { return this.querySelector(sel); }";

const SHADOW_JS: &str = "function() { return this.shadowRoot; }";

const FRAME_JS: &str = "function() { return this.contentDocument; }";

/// Returns `null` while the scope has no `table` yet, otherwise an array of
/// `{cells, link}` objects in document order. The link is the anchor of the
/// first value cell only; a link elsewhere in the row must not stand in for
/// a missing number-cell anchor.
const READ_ROWS_JS: &str = r#"function(rowSel, cellSel) {
    if (!this.querySelector('table')) { return null; }
    return Array.from(this.querySelectorAll(rowSel)).map(function(tr) {
        var cells = Array.from(tr.querySelectorAll(cellSel)).map(function(td) {
            return (td.innerText || td.textContent || '').trim();
        });
        var first = tr.querySelector(cellSel);
        var anchor = first ? first.querySelector('a') : null;
        return { cells: cells, link: anchor ? anchor.href : null };
    });
}"#;

/// Sets the value through the native property setter so framework-managed
/// inputs see the change, then fires input/change.
const FILL_JS: &str = r#"function(sel, text) {
    var el = this.querySelector(sel);
    if (!el) { return false; }
    var desc = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value');
    if (desc && desc.set) { desc.set.call(el, text); } else { el.value = text; }
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}"#;

const SUBMIT_JS: &str = r#"function(sel) {
    var el = this.querySelector(sel);
    if (!el || !el.form) { return false; }
    el.form.submit();
    return true;
}"#;

/// Live page bound to one browser target.
pub struct CdpPage<'a> {
    cdp: &'a CdpClient,
}

impl<'a> CdpPage<'a> {
    pub fn new(cdp: &'a CdpClient) -> Self {
        Self { cdp }
    }

    async fn eval_string(&self, expression: &str) -> Result<String, ScrapeError> {
        let result = self.cdp.evaluate(expression, true).await?;
        match result_value(&result) {
            Value::String(s) => Ok(s),
            other => Err(ScrapeError::Page(format!(
                "{} returned non-string: {}",
                expression, other
            ))),
        }
    }

    async fn call_for_handle(
        &self,
        object_id: &str,
        function: &str,
        arguments: Vec<Value>,
    ) -> Result<Option<String>, ScrapeError> {
        let result = self
            .cdp
            .call_function_on(object_id, function, arguments, false)
            .await?;
        Ok(result_object_id(&result))
    }
}

#[async_trait]
impl PageProbe for CdpPage<'_> {
    async fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        let result = self.cdp.navigate(url).await?;
        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            if !error_text.is_empty() {
                return Err(ScrapeError::Page(format!(
                    "navigation to {} failed: {}",
                    url, error_text
                )));
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScrapeError> {
        self.eval_string("window.location.href").await
    }

    async fn ready_state(&self) -> Result<String, ScrapeError> {
        self.eval_string("document.readyState").await
    }

    async fn root_scope(&self) -> Result<DomScope, ScrapeError> {
        let result = self.cdp.evaluate("document", false).await?;
        result_object_id(&result)
            .map(DomScope)
            .ok_or_else(|| ScrapeError::Page("document has no remote handle".to_string()))
    }

    async fn query(
        &self,
        scope: &DomScope,
        selector: &str,
    ) -> Result<Option<DomNode>, ScrapeError> {
        trace!(selector, "querySelector");
        let handle = self
            .call_for_handle(&scope.0, QUERY_JS, vec![json!(selector)])
            .await?;
        Ok(handle.map(DomNode))
    }

    async fn shadow_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError> {
        let handle = self.call_for_handle(&node.0, SHADOW_JS, vec![]).await?;
        Ok(handle.map(DomScope))
    }

    async fn frame_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError> {
        let handle = self.call_for_handle(&node.0, FRAME_JS, vec![]).await?;
        Ok(handle.map(DomScope))
    }

    async fn read_rows(
        &self,
        scope: &DomScope,
        row_selector: &str,
        cell_selector: &str,
    ) -> Result<Option<Vec<RawRow>>, ScrapeError> {
        let result = self
            .cdp
            .call_function_on(
                &scope.0,
                READ_ROWS_JS,
                vec![json!(row_selector), json!(cell_selector)],
                true,
            )
            .await?;
        parse_rows(result_value(&result))
    }

    async fn fill(
        &self,
        scope: &DomScope,
        selector: &str,
        text: &str,
    ) -> Result<bool, ScrapeError> {
        let result = self
            .cdp
            .call_function_on(&scope.0, FILL_JS, vec![json!(selector), json!(text)], true)
            .await?;
        Ok(result_value(&result).as_bool().unwrap_or(false))
    }

    async fn submit_form(&self, scope: &DomScope, selector: &str) -> Result<bool, ScrapeError> {
        let result = self
            .cdp
            .call_function_on(&scope.0, SUBMIT_JS, vec![json!(selector)], true)
            .await?;
        Ok(result_value(&result).as_bool().unwrap_or(false))
    }
}

/// Decode the `READ_ROWS_JS` return value: `null` means no table yet.
fn parse_rows(value: Value) -> Result<Option<Vec<RawRow>>, ScrapeError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ScrapeError::Page(format!("malformed table payload: {}", e)))
}
