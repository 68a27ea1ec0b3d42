//! In-memory `PageProbe` stub shared by the pipeline tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::frame::{FRAME_SELECTOR, MACROPONENT_TAG};
use crate::login::{PASSWORD_SELECTOR, USERNAME_SELECTOR};
use crate::probe::{DomNode, DomScope, PageProbe, RawRow};

pub const TEST_URL: &str = "https://example.service-now.com/task_list.do";

/// A fake page with three scopes — "root", "shadow", "frame" — whose
/// structure is toggled per test. Interactions are recorded so tests can
/// assert what the pipeline did.
pub struct StubPage {
    pub url: String,
    pub ready: &'static str,
    pub has_macroponent: bool,
    pub has_shadow: bool,
    pub has_iframe: bool,
    /// `None` simulates "no table element yet".
    pub rows: Option<Vec<RawRow>>,
    /// Whether form fields exist to be filled/submitted.
    pub fillable: bool,
    /// How long after `navigate` the login form takes to render.
    pub login_delay: Duration,
    pub navigated_at: Mutex<Option<Instant>>,
    pub navigations: Mutex<Vec<String>>,
    pub fills: Mutex<Vec<(String, String)>>,
    pub submitted: Mutex<Vec<String>>,
}

impl Default for StubPage {
    fn default() -> Self {
        Self {
            url: TEST_URL.to_string(),
            ready: "complete",
            has_macroponent: true,
            has_shadow: true,
            has_iframe: true,
            rows: Some(vec![]),
            fillable: true,
            login_delay: Duration::ZERO,
            navigated_at: Mutex::new(None),
            navigations: Mutex::new(vec![]),
            fills: Mutex::new(vec![]),
            submitted: Mutex::new(vec![]),
        }
    }
}

/// The single well-formed row used across tests.
pub fn incident_row() -> RawRow {
    RawRow {
        cells: vec![
            "INC0012345".to_string(),
            "J. Doe".to_string(),
            "In Progress".to_string(),
            "VPN issue".to_string(),
            "03/14/2024 09:15:00 AM".to_string(),
        ],
        link: Some("https://example/inc/12345".to_string()),
    }
}

impl StubPage {
    /// The login fields count as present only once `login_delay` has
    /// elapsed since the last `navigate`.
    fn login_form_present(&self) -> bool {
        if !self.fillable {
            return false;
        }
        if self.login_delay.is_zero() {
            return true;
        }
        match *self.navigated_at.lock().unwrap() {
            Some(at) => at.elapsed() >= self.login_delay,
            None => false,
        }
    }
}

#[async_trait]
impl PageProbe for StubPage {
    async fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        *self.navigated_at.lock().unwrap() = Some(Instant::now());
        self.navigations.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.url.clone())
    }

    async fn ready_state(&self) -> Result<String, ScrapeError> {
        Ok(self.ready.to_string())
    }

    async fn root_scope(&self) -> Result<DomScope, ScrapeError> {
        Ok(DomScope("root".to_string()))
    }

    async fn query(
        &self,
        scope: &DomScope,
        selector: &str,
    ) -> Result<Option<DomNode>, ScrapeError> {
        let found = match (scope.0.as_str(), selector) {
            ("root", s) if s == MACROPONENT_TAG => self.has_macroponent,
            ("root", s) if s == USERNAME_SELECTOR || s == PASSWORD_SELECTOR => {
                self.login_form_present()
            }
            ("shadow", s) if s == FRAME_SELECTOR => self.has_iframe,
            _ => false,
        };
        Ok(found.then(|| DomNode(selector.to_string())))
    }

    async fn shadow_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError> {
        if node.0 == MACROPONENT_TAG && self.has_shadow {
            Ok(Some(DomScope("shadow".to_string())))
        } else {
            Ok(None)
        }
    }

    async fn frame_scope(&self, node: &DomNode) -> Result<Option<DomScope>, ScrapeError> {
        if node.0 == FRAME_SELECTOR {
            Ok(Some(DomScope("frame".to_string())))
        } else {
            Ok(None)
        }
    }

    async fn read_rows(
        &self,
        scope: &DomScope,
        _row_selector: &str,
        _cell_selector: &str,
    ) -> Result<Option<Vec<RawRow>>, ScrapeError> {
        if scope.0 != "frame" {
            return Ok(None);
        }
        Ok(self.rows.clone())
    }

    async fn fill(
        &self,
        _scope: &DomScope,
        selector: &str,
        text: &str,
    ) -> Result<bool, ScrapeError> {
        if !self.login_form_present() {
            return Ok(false);
        }
        self.fills
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(true)
    }

    async fn submit_form(&self, _scope: &DomScope, selector: &str) -> Result<bool, ScrapeError> {
        if !self.login_form_present() {
            return Ok(false);
        }
        self.submitted.lock().unwrap().push(selector.to_string());
        Ok(true)
    }
}
