//! Browser process lifecycle.
//!
//! Launches a Chromium-family browser with a remote debugging port, waits
//! for the DevTools HTTP endpoint, resolves the page target's WebSocket URL
//! and connects a [`CdpClient`] to it. One session drives one scrape run.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::cdp::CdpClient;
use crate::error::BrowserError;

/// Supported browser engines. The ticketing deployment this tool targets is
/// driven with Edge in production; Chrome works identically over CDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserEngine {
    Edge,
    Chrome,
}

impl BrowserEngine {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Self::Chrome,
            _ => Self::Edge,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Chrome => "chrome",
        }
    }
}

/// Launch parameters for a session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub engine: BrowserEngine,
    pub headless: bool,
    /// Profile directory; created if absent.
    pub user_data_dir: PathBuf,
}

/// A single browser session: the child process plus its CDP connection.
pub struct BrowserSession {
    pub engine: BrowserEngine,
    pub debug_port: u16,
    process: Child,
    pub cdp: CdpClient,
}

impl BrowserSession {
    /// Launch the browser and connect to its first page target.
    pub async fn launch(opts: &LaunchOptions) -> Result<Self, BrowserError> {
        let browser_path = find_browser_binary(opts.engine).ok_or_else(|| {
            BrowserError::Launch(format!("{} not found on this system", opts.engine.name()))
        })?;

        std::fs::create_dir_all(&opts.user_data_dir)?;

        let debug_port = find_free_port().await?;
        let args = build_browser_args(debug_port, &opts.user_data_dir, opts.headless);

        info!(
            browser = opts.engine.name(),
            port = debug_port,
            headless = opts.headless,
            "launching browser"
        );

        let process = Command::new(&browser_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::Launch(format!("{}: {}", opts.engine.name(), e)))?;

        wait_for_cdp_ready(debug_port, Duration::from_secs(15)).await?;
        let page_ws_url = get_page_ws_url(debug_port).await?;

        let cdp = CdpClient::connect(&page_ws_url).await?;
        cdp.enable_domain("Page").await?;
        cdp.enable_domain("Runtime").await?;

        debug!(ws_url = %page_ws_url, "CDP connection established (page target)");

        Ok(Self {
            engine: opts.engine,
            debug_port,
            process,
            cdp,
        })
    }

    /// Close the session: graceful `Browser.close`, then kill the process.
    pub async fn close(&mut self) {
        if let Err(e) = self.cdp.send_command("Browser.close", json!({})).await {
            debug!("CDP Browser.close failed (may already be closed): {}", e);
        }
        let _ = self.process.kill().await;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort kill on drop
        let _ = self.process.start_kill();
    }
}

/// Chromium command line for a scripted, disposable profile.
fn build_browser_args(debug_port: u16, user_data_dir: &Path, headless: bool) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", debug_port),
        format!("--user-data-dir={}", user_data_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-extensions".to_string(),
        "--disable-sync".to_string(),
        "--no-sandbox".to_string(),
        "--password-store=basic".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    args.push("--window-size=1280,720".to_string());
    args.push("about:blank".to_string());
    args
}

/// Find a browser binary on the system for the given engine.
pub fn find_browser_binary(engine: BrowserEngine) -> Option<String> {
    let candidates = match engine {
        BrowserEngine::Edge => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"]
            } else if cfg!(target_os = "linux") {
                vec![
                    "microsoft-edge",
                    "microsoft-edge-stable",
                    "/usr/bin/microsoft-edge",
                ]
            } else {
                vec![
                    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
                ]
            }
        }
        BrowserEngine::Chrome => {
            if cfg!(target_os = "macos") {
                vec![
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                    "/Applications/Chromium.app/Contents/MacOS/Chromium",
                ]
            } else if cfg!(target_os = "linux") {
                vec![
                    "google-chrome",
                    "google-chrome-stable",
                    "chromium",
                    "chromium-browser",
                    "/usr/bin/google-chrome",
                    "/usr/bin/chromium",
                ]
            } else {
                vec![
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ]
            }
        }
    };

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') && which::which(candidate).is_ok()
        {
            return Some(candidate.to_string());
        }
    }
    None
}

/// List the engines available on this system, for diagnostics.
pub fn list_available_browsers() -> Vec<(BrowserEngine, String)> {
    let mut result = Vec::new();
    for engine in [BrowserEngine::Edge, BrowserEngine::Chrome] {
        if let Some(path) = find_browser_binary(engine) {
            result.push((engine, path));
        }
    }
    result
}

/// Find a free TCP port.
async fn find_free_port() -> Result<u16, BrowserError> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener
        .local_addr()
        .map_err(|e| BrowserError::Launch(format!("failed to get local addr: {}", e)))?
        .port();
    drop(listener);
    Ok(port)
}

/// Poll `/json/version` until the DevTools endpoint answers.
async fn wait_for_cdp_ready(port: u16, timeout: Duration) -> Result<(), BrowserError> {
    let start = std::time::Instant::now();
    let url = format!("http://127.0.0.1:{}/json/version", port);

    loop {
        if start.elapsed() > timeout {
            return Err(BrowserError::Discovery(format!(
                "DevTools not ready after {:?} on port {}",
                timeout, port
            )));
        }

        if let Ok(resp) = reqwest::get(&url).await {
            if let Ok(body) = resp.json::<Value>().await {
                if body.get("webSocketDebuggerUrl").is_some() {
                    return Ok(());
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Resolve the first page target's WebSocket URL via `/json/list`. Retries
/// a few times since the page target may not appear immediately.
async fn get_page_ws_url(port: u16) -> Result<String, BrowserError> {
    let url = format!("http://127.0.0.1:{}/json/list", port);

    for attempt in 0..10 {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        let resp = match reqwest::get(&url).await {
            Ok(r) => r,
            Err(_) => continue,
        };
        let targets: Vec<Value> = match resp.json().await {
            Ok(t) => t,
            Err(_) => continue,
        };

        for target in &targets {
            if target.get("type").and_then(|v| v.as_str()) == Some("page") {
                if let Some(ws_url) = target.get("webSocketDebuggerUrl").and_then(|v| v.as_str())
                {
                    return Ok(ws_url.to_string());
                }
            }
        }
    }

    Err(BrowserError::Discovery(
        "no page target found after retries".to_string(),
    ))
}
