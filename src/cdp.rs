//! Chrome DevTools Protocol session implementation

use crate::{ConsoleMessage, Driver, Error, Result, SessionConfig};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions};
use log::warn;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type ConsoleBuffer = Arc<Mutex<Vec<ConsoleMessage>>>;

/// CDP-based session implementation (uses the `headless_chrome` crate)
///
/// Launches a headless Chrome instance, manages a single tab, and provides
/// the `Driver` trait implementation over it. Console output is buffered
/// through a page binding and handed out via `drain_console`.
pub struct CdpSession {
    // Kept alive for the lifetime of the session; dropping it terminates
    // the Chrome child process.
    _browser: Browser,
    tab: Arc<Tab>,
    config: SessionConfig,
    console: ConsoleBuffer,
}

impl CdpSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        let console: ConsoleBuffer = Arc::new(Mutex::new(Vec::new()));
        install_console_hook(&tab, console.clone());

        Ok(Self {
            _browser: browser,
            tab,
            config,
            console,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Driver for CdpSession {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        Ok(())
    }

    fn execute_script(&mut self, script: &str) -> Result<serde_json::Value> {
        // Wrap the expression so structured values cross the protocol as
        // JSON text; `undefined` results come back with no value at all.
        let wrapped = format!("JSON.stringify({})", script);

        let eval = self
            .tab
            .evaluate(&wrapped, false)
            .map_err(|e| Error::ScriptError(format!("Evaluation failed: {}", e)))?;

        match eval.value {
            Some(serde_json::Value::String(text)) => serde_json::from_str(&text)
                .map_err(|e| Error::ScriptError(format!("Malformed script result: {}", e))),
            Some(value) => Ok(value),
            None => Ok(serde_json::Value::Null),
        }
    }

    fn screenshot_png(&mut self) -> Result<Vec<u8>> {
        let screenshot_data = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        Ok(screenshot_data)
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Normal {
                left: None,
                top: None,
                width: Some(f64::from(width)),
                height: Some(f64::from(height)),
            })
            .map_err(|e| Error::RenderError(format!("Failed to resize window: {}", e)))?;
        Ok(())
    }

    fn maximize_window(&mut self) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Maximized)
            .map_err(|e| Error::RenderError(format!("Failed to maximize window: {}", e)))?;
        Ok(())
    }

    fn drain_console(&mut self) -> Vec<ConsoleMessage> {
        match self.console.lock() {
            Ok(mut buffer) => buffer.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn close(&mut self) -> Result<()> {
        // Closing the tab first lets the renderer shut down before the
        // browser handle is dropped.
        let _ = self.tab.close(true);
        Ok(())
    }
}

/// Expose a binding the page can call with console payloads and install a
/// wrapper around the console methods on every new document.
///
/// Hook failures are non-fatal: an export still works without console
/// diagnostics, so both steps degrade to a warning.
fn install_console_hook(tab: &Arc<Tab>, buffer: ConsoleBuffer) {
    let sink = buffer.clone();
    let _ = tab
        .expose_function(
            "__ps_console",
            Arc::new(move |payload: serde_json::Value| {
                // payload may arrive as a JSON string
                let msg = if payload.is_string() {
                    let text = payload.as_str().unwrap_or("");
                    match serde_json::from_str::<serde_json::Value>(text) {
                        Ok(value) => value,
                        Err(_) => serde_json::Value::String(text.to_string()),
                    }
                } else {
                    payload
                };

                let level = match msg.get("level").and_then(|v| v.as_str()) {
                    Some(level) => level.to_string(),
                    None => return,
                };

                let text = match msg.get("args") {
                    Some(serde_json::Value::Array(args)) => args
                        .iter()
                        .map(|v| {
                            v.as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| v.to_string())
                        })
                        .collect::<Vec<_>>()
                        .join(" "),
                    Some(args) => args.to_string(),
                    None => String::new(),
                };

                if let Ok(mut messages) = sink.lock() {
                    messages.push(ConsoleMessage {
                        level,
                        text,
                        source: None,
                        line: None,
                        column: None,
                    });
                }
            }),
        )
        .map_err(|e| warn!("Failed to expose console binding: {}", e))
        .ok();

    // Wrap console methods and uncaught errors to post through the binding
    let wrapper = r#"(function(){
        var sink = window.__ps_console;
        if (!sink) return;
        ['log','info','warn','error'].forEach(function(k){
            var orig = console[k];
            console[k] = function(...args){
                try { sink(JSON.stringify({ level: k, args: args.map(function(a){ return String(a); }) })); } catch (e) {}
                try { orig.apply(console, args); } catch (e) {}
            };
        });
        window.addEventListener('error', function(ev){
            try { sink(JSON.stringify({ level: 'error', args: [String(ev.message)] })); } catch (e) {}
        });
    })();"#;

    let _ = tab
        .call_method(Page::AddScriptToEvaluateOnNewDocument {
            source: wrapper.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })
        .map_err(|e| warn!("Failed to inject console wrapper: {}", e))
        .ok();
}
