//! Plotshot Export Engine
//!
//! Exports web-rendered plot documents ("layouts") to static PNG or SVG
//! files by driving a headless browser session: the layout is embedded in a
//! standalone HTML document, loaded in the browser, polled until the in-page
//! plot runtime signals render completion, and then captured either as a
//! raster screenshot or as serialized SVG nodes from the DOM.
//!
//! # Features
//!
//! - **CDP Backend** (default): Uses Chrome DevTools Protocol via headless Chrome
//! - **Driver Seam**: Export orchestration runs against a small `Driver` trait,
//!   so callers may supply their own session (and tests a scripted one)
//! - **Shared Session**: Exports that are not handed a driver borrow a
//!   process-wide session that is created lazily and reused
//!
//! # Example
//!
//! ```no_run
//! use plotshot::export::{export_png, ExportOptions};
//! use plotshot::layout::{Layout, Plot};
//!
//! # fn main() -> plotshot::Result<()> {
//! let layout = Layout::Plot(Plot::new("my plot", 640, 480));
//! let path = export_png(&layout, &ExportOptions::default())?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod embed;
pub mod export;
pub mod layout;

#[cfg(feature = "cdp")]
pub mod cdp;

// Process-wide default session, borrowed by exports without an explicit driver
#[cfg(feature = "cdp")]
pub mod control;

// Async-friendly export facade (worker-backed)
#[cfg(feature = "cdp")]
pub mod async_api;

#[cfg(feature = "cdp")]
pub use async_api::AsyncExporter;

pub use embed::Resources;
pub use export::ExportOptions;
pub use layout::{Layout, OutputBackend, Plot, Widget};

/// Configuration for a browser session used during export
///
/// The defaults match what the export sequence expects: a fixed-size window
/// the viewport-fitting step later resizes, and a generous navigation timeout
/// for the initial `file://` load.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Initial window dimensions
    pub viewport: Viewport,
    /// Timeout for page navigation in milliseconds
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 30000,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Console message captured from the automated browser session
///
/// Warning- and error-level messages are surfaced as diagnostic log output
/// before an export returns.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    /// Level such as "log", "warn", or "error"
    pub level: String,
    /// Textual content of the message
    pub text: String,
    /// Optional source/filename if available
    pub source: Option<String>,
    /// Optional line number if available
    pub line: Option<u32>,
    /// Optional column number if available
    pub column: Option<u32>,
}

/// Core trait for browser sessions driven by the export sequence
///
/// The surface is deliberately small and object-safe: the orchestration in
/// [`export`] only ever navigates, evaluates scripts, adjusts the window and
/// captures screenshots, and tests drive it with a scripted implementation.
pub trait Driver {
    /// Navigate the session to a URL and wait for the load to settle
    fn goto(&mut self, url: &str) -> Result<()>;

    /// Evaluate a JavaScript expression and return its JSON-decoded value
    ///
    /// Scripts are expressions (IIFEs for anything with statements). The
    /// result must survive JSON serialization; `undefined` maps to null.
    fn execute_script(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Capture the current viewport as PNG bytes
    fn screenshot_png(&mut self) -> Result<Vec<u8>>;

    /// Resize the browser window
    fn set_window_size(&mut self, width: u32, height: u32) -> Result<()>;

    /// Maximize the browser window
    fn maximize_window(&mut self) -> Result<()>;

    /// Take the console messages captured since the last drain
    fn drain_console(&mut self) -> Vec<ConsoleMessage>;

    /// Release the session
    fn close(&mut self) -> Result<()>;
}

/// Create a new browser session with the default backend
#[cfg(feature = "cdp")]
pub fn new_session(config: SessionConfig) -> Result<impl Driver> {
    cdp::CdpSession::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.timeout_ms, 30000);
    }

    #[test]
    fn test_viewport() {
        let viewport = Viewport {
            width: 1920,
            height: 1080,
        };
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }
}
