//! Standalone HTML generation for layouts
//!
//! The export sequence never serves pages; it writes a single self-contained
//! HTML document to a temp file and points the browser at it. The document
//! pulls in the plot runtime per [`Resources`], carries the serialized layout
//! payload, and bootstraps `Plotshot.embed.render` once the DOM is ready.

use crate::layout::Layout;

/// Class of the root element the runtime renders into. The wait and capture
/// scripts in [`crate::export`] locate the rendered output through it.
pub const ROOT_CLASS: &str = "ps-root";

const ROOT_ID: &str = "ps-export-root";

const DEFAULT_CDN_JS: &str = "https://cdn.plotshot.io/release/plotshot-0.1.0.min.js";

/// Where the generated page loads the plot runtime from
#[derive(Debug, Clone)]
pub enum Resources {
    /// A `<script src=...>` tag pointing at a hosted runtime bundle
    Cdn { js_url: String },
    /// The runtime bundle text embedded directly into the page
    Inline { js_source: String },
}

impl Default for Resources {
    fn default() -> Self {
        Resources::Cdn {
            js_url: DEFAULT_CDN_JS.to_string(),
        }
    }
}

impl Resources {
    pub fn cdn(js_url: impl Into<String>) -> Self {
        Resources::Cdn {
            js_url: js_url.into(),
        }
    }

    pub fn inline(js_source: impl Into<String>) -> Self {
        Resources::Inline {
            js_source: js_source.into(),
        }
    }

    fn script_tag(&self) -> String {
        match self {
            Resources::Cdn { js_url } => format!(r#"<script src="{}"></script>"#, js_url),
            Resources::Inline { js_source } => {
                format!("<script>\n{}\n</script>", js_source)
            }
        }
    }
}

/// Render a layout to a standalone HTML document
///
/// `width`/`height` override the layout's own dimensions when it is a bare
/// plot; see [`Layout::resized`]. The preamble style zeroes body margins and
/// hides overflow so the screenshot is exactly the rendered root.
pub fn layout_html(
    layout: &Layout,
    resources: &Resources,
    title: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> String {
    let layout = layout.resized(width, height);
    let payload = serde_json::to_string(&layout)
        .unwrap_or_else(|_| "null".to_string())
        // keep an embedded "</script>" from terminating the bootstrap block
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  html, body {{
    margin: 0;
    width: 100%;
    height: 100%;
    overflow: hidden;
  }}
</style>
{script_tag}
</head>
<body>
<div class="{root_class}" id="{root_id}"></div>
<script>
(function() {{
  var spec = {payload};
  function render() {{
    Plotshot.embed.render(spec, document.getElementById("{root_id}"));
  }}
  if (document.readyState !== "loading")
    render();
  else
    document.addEventListener("DOMContentLoaded", render);
}})();
</script>
</body>
</html>
"#,
        title = title,
        script_tag = resources.script_tag(),
        root_class = ROOT_CLASS,
        root_id = ROOT_ID,
        payload = payload,
    )
}
