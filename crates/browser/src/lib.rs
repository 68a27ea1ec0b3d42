//! Chromium-family browser automation over the Chrome DevTools Protocol.
//!
//! Two layers:
//!
//! - [`cdp`]: WebSocket client with command/response correlation.
//! - [`session`]: browser process lifecycle — find a binary, launch it with
//!   a debugging port, connect to the page target, close everything down.

pub mod cdp;
pub mod error;
pub mod session;

pub use cdp::CdpClient;
pub use error::BrowserError;
pub use session::{BrowserEngine, BrowserSession, LaunchOptions};
