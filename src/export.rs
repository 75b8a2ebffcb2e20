//! Export orchestration: render, load, wait, capture, write
//!
//! Every export runs the same fixed sequence: the layout is rendered to a
//! standalone HTML document in a scoped temp file, the browser session
//! navigates to it, the sequence polls until the in-page runtime reports
//! initialization and then render completion, and finally either a raster
//! screenshot or the serialized SVG nodes are captured. The temp file is
//! removed on every exit path, including errors.

use crate::embed::{self, Resources};
use crate::layout::Layout;
use crate::{ConsoleMessage, Driver, Error, Result};
use image::RgbaImage;
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default wait budget for runtime initialization and render completion
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between condition polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// True once the plot runtime has initialized and registered a document
const RUNTIME_LOADED_CONDITION: &str = r#"(typeof Plotshot !== "undefined" && Plotshot.documents != null && Plotshot.documents.length != 0)"#;

/// Wires the document's idle signal to a window-level completion flag.
/// Injected only after the runtime-loaded condition holds.
const WAIT_SCRIPT: &str = r#"(function() {
  window._plotshot_render_complete = false;
  function done() {
    window._plotshot_render_complete = true;
  }
  var doc = window.Plotshot.documents[0];
  if (doc.is_idle)
    done();
  else
    doc.idle.connect(done);
})()"#;

const RENDER_COMPLETE_CONDITION: &str = "(window._plotshot_render_complete === true)";

/// Serializes every `<svg>` under the render root
const SVG_SCRIPT: &str = r#"(function() {
  var serialized = [];
  var svgs = document.getElementsByClassName("ps-root")[0].getElementsByTagName("svg");
  for (var i = 0; i < svgs.length; i++) {
    serialized.push(new XMLSerializer().serializeToString(svgs[i]));
  }
  return serialized;
})()"#;

/// Measures the window size needed to show the rendered root in full
const WINDOW_SIZE_SCRIPT: &str = r#"(function() {
  var root = document.getElementsByClassName("ps-root")[0];
  var rect = root.children[0].getBoundingClientRect();
  return [
    window.outerWidth - window.innerWidth + rect.width,
    window.outerHeight - window.innerHeight + rect.height,
  ];
})()"#;

/// Options accepted by the export entry points
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output path; derived from the current executable name when absent
    pub filename: Option<PathBuf>,
    /// Width override, applied only to bare-plot layouts
    pub width: Option<u32>,
    /// Height override, applied only to bare-plot layouts
    pub height: Option<u32>,
    /// Wait budget for runtime load and for render completion
    pub timeout: Duration,
    /// Where the generated page loads the plot runtime from
    pub resources: Resources,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: None,
            width: None,
            height: None,
            timeout: DEFAULT_TIMEOUT,
            resources: Resources::default(),
        }
    }
}

impl ExportOptions {
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }
}

/// Export a layout as a PNG using the shared session
///
/// Returns the absolute path of the written file.
#[cfg(feature = "cdp")]
pub fn export_png(layout: &Layout, options: &ExportOptions) -> Result<PathBuf> {
    crate::control::session_control().with_session(|driver| export_png_with(layout, driver, options))
}

/// Export a layout as a PNG through a caller-supplied session
pub fn export_png_with(
    layout: &Layout,
    driver: &mut dyn Driver,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let image = screenshot_as_png(layout, driver, options)?;
    ensure_nonempty(&image)?;

    let filename = match &options.filename {
        Some(path) => path.clone(),
        None => default_filename("png"),
    };
    image.save(&filename)?;

    absolute(&filename)
}

/// Export the SVG-backed plots within a layout, one file per plot, using
/// the shared session
///
/// The first file gets the requested name, the rest `name_1.svg`,
/// `name_2.svg`, ... A layout that produces no SVG nodes yields an empty
/// list and a warning, not an error.
#[cfg(feature = "cdp")]
pub fn export_svgs(layout: &Layout, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    crate::control::session_control().with_session(|driver| export_svgs_with(layout, driver, options))
}

/// Export the SVG-backed plots within a layout through a caller-supplied
/// session
pub fn export_svgs_with(
    layout: &Layout,
    driver: &mut dyn Driver,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>> {
    let svgs = svg_markup(layout, driver, options)?;

    if svgs.is_empty() {
        warn!("no SVG plots were found in the layout");
        return Ok(Vec::new());
    }

    let filename = match &options.filename {
        Some(path) => path.clone(),
        None => default_filename("svg"),
    };

    let mut written = Vec::with_capacity(svgs.len());
    for (i, svg) in svgs.iter().enumerate() {
        let path = if i == 0 {
            filename.clone()
        } else {
            numbered_filename(&filename, i)
        };
        std::fs::write(&path, svg)?;
        written.push(absolute(&path)?);
    }

    Ok(written)
}

/// Render a layout in the session and capture it as a decoded RGBA image
///
/// Lower-level accessor behind [`export_png_with`]; no file is written.
pub fn screenshot_as_png(
    layout: &Layout,
    driver: &mut dyn Driver,
    options: &ExportOptions,
) -> Result<RgbaImage> {
    let html = embed::layout_html(layout, &options.resources, "", options.width, options.height);
    let tmp = TempHtml::create(&html)?;

    driver.maximize_window()?;
    driver.goto(tmp.url()?.as_str())?;
    wait_until_render_complete(driver, options.timeout)?;
    fit_viewport(driver)?;
    let png = driver.screenshot_png()?;

    let image = image::load_from_memory(&png)?;
    Ok(image.to_rgba8())
}

/// Render a layout in the session and collect the serialized SVG nodes
///
/// Lower-level accessor behind [`export_svgs_with`]; no files are written.
pub fn svg_markup(
    layout: &Layout,
    driver: &mut dyn Driver,
    options: &ExportOptions,
) -> Result<Vec<String>> {
    let html = embed::layout_html(layout, &options.resources, "", options.width, options.height);
    let tmp = TempHtml::create(&html)?;

    driver.goto(tmp.url()?.as_str())?;
    wait_until_render_complete(driver, options.timeout)?;

    let value = driver.execute_script(SVG_SCRIPT)?;
    let svgs = match value.as_array() {
        Some(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        None => Vec::new(),
    };

    debug!("collected {} serialized SVG node(s)", svgs.len());
    Ok(svgs)
}

/// Poll the page until the runtime reports initialization, then until it
/// reports render completion
///
/// A runtime that never initializes is fatal. A render that never reports
/// completion is suspicious but non-fatal: the export proceeds with
/// whatever has been drawn, after a warning. Console warnings and errors
/// captured by the session are surfaced in every outcome.
pub fn wait_until_render_complete(driver: &mut dyn Driver, timeout: Duration) -> Result<()> {
    if !poll_condition(driver, RUNTIME_LOADED_CONDITION, timeout)? {
        log_console(driver);
        return Err(Error::RuntimeNotLoaded(timeout.as_millis() as u64));
    }

    driver.execute_script(WAIT_SCRIPT)?;

    let completed = poll_condition(driver, RENDER_COMPLETE_CONDITION, timeout);
    log_console(driver);
    match completed {
        Ok(true) => {}
        Ok(false) => warn!(
            "timed out waiting for the render-complete signal; the exported output may be incomplete"
        ),
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Evaluate `script` until it returns true or `timeout` elapses
///
/// The condition is checked at least once, so a zero timeout still sees a
/// page that is already ready.
fn poll_condition(driver: &mut dyn Driver, script: &str, timeout: Duration) -> Result<bool> {
    let start = Instant::now();
    loop {
        let value = driver.execute_script(script)?;
        if value.as_bool().unwrap_or(false) {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Resize the window so the screenshot covers the rendered root exactly
fn fit_viewport(driver: &mut dyn Driver) -> Result<()> {
    let value = driver.execute_script(WINDOW_SIZE_SCRIPT)?;
    let dims = value
        .as_array()
        .ok_or_else(|| Error::ScriptError("window size script returned a non-array value".to_string()))?;

    match (
        dims.first().and_then(|v| v.as_f64()),
        dims.get(1).and_then(|v| v.as_f64()),
    ) {
        (Some(width), Some(height)) if width >= 0.0 && height >= 0.0 => {
            driver.set_window_size(width.ceil() as u32, height.ceil() as u32)
        }
        _ => Err(Error::ScriptError(
            "window size script returned invalid dimensions".to_string(),
        )),
    }
}

/// Surface warning- and error-level console output from the session
fn log_console(driver: &mut dyn Driver) {
    let messages: Vec<ConsoleMessage> = driver
        .drain_console()
        .into_iter()
        .filter(|m| is_surfaced_level(&m.level))
        .collect();

    if messages.is_empty() {
        return;
    }

    warn!("there were browser warnings and/or errors that may have affected the export");
    for message in messages {
        warn!("[browser {}] {}", message.level, message.text);
    }
}

fn is_surfaced_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "warn" | "warning" | "error" | "severe"
    )
}

fn ensure_nonempty(image: &RgbaImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Derive an output filename from the current executable name
/// (`myplot` runs export to `myplot.png`)
fn default_filename(ext: &str) -> PathBuf {
    let stem = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_os_string()));
    match stem {
        Some(stem) => PathBuf::from(format!("{}.{}", stem.to_string_lossy(), ext)),
        None => PathBuf::from(format!("plotshot.{}", ext)),
    }
}

/// `plot.svg` -> `plot_1.svg`, `plot_2.svg`, ...
fn numbered_filename(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    base.with_file_name(name)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Scoped temp file holding the generated HTML
///
/// The backing file is removed when the guard drops, which happens on every
/// exit path of the export sequence.
struct TempHtml {
    file: tempfile::NamedTempFile,
}

impl TempHtml {
    fn create(html: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("plotshot")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    fn url(&self) -> Result<url::Url> {
        url::Url::from_file_path(self.file.path()).map_err(|_| {
            Error::Other(format!(
                "temp path is not absolute: {}",
                self.file.path().display()
            ))
        })
    }
}
