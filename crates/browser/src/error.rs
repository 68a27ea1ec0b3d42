use std::time::Duration;

use thiserror::Error;

/// Errors from the CDP transport and browser process lifecycle.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("failed to connect to DevTools at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("CDP command '{method}' timed out after {timeout:?}")]
    CommandTimeout { method: String, timeout: Duration },

    #[error("JavaScript exception: {0}")]
    JsException(String),

    #[error("CDP protocol error: {0}")]
    Protocol(String),

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("DevTools endpoint not ready: {0}")]
    Discovery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
