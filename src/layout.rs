//! Layout documents accepted by the export entry points
//!
//! A [`Layout`] is a renderable widget tree: plots (the only leaves that draw
//! anything exportable), rows, columns and opaque widgets. The tree is
//! serialized into the generated HTML and interpreted by the in-page plot
//! runtime; this crate never renders it itself.

use log::warn;
use serde::{Deserialize, Serialize};

/// Drawing backend a plot asks the runtime for
///
/// Only `Svg`-backed plots leave `<svg>` nodes in the DOM, so only they
/// contribute files to an SVG export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    #[default]
    Canvas,
    Svg,
}

/// A single plot leaf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plot {
    pub title: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub output_backend: OutputBackend,
    /// Opaque payload interpreted by the in-page runtime
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl Plot {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            output_backend: OutputBackend::default(),
            spec: serde_json::Value::Null,
        }
    }

    pub fn with_backend(mut self, backend: OutputBackend) -> Self {
        self.output_backend = backend;
        self
    }

    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = spec;
        self
    }
}

/// A non-plot leaf (slider, table, ...), carried through to the runtime
/// untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub kind: String,
    #[serde(default)]
    pub spec: serde_json::Value,
}

/// A renderable visualization document or widget tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layout {
    Plot(Plot),
    Row { children: Vec<Layout> },
    Column { children: Vec<Layout> },
    Widget(Widget),
}

impl Layout {
    pub fn row(children: Vec<Layout>) -> Self {
        Layout::Row { children }
    }

    pub fn column(children: Vec<Layout>) -> Self {
        Layout::Column { children }
    }

    /// Whether any plot leaf uses the SVG backend
    pub fn has_svg_plots(&self) -> bool {
        match self {
            Layout::Plot(plot) => plot.output_backend == OutputBackend::Svg,
            Layout::Row { children } | Layout::Column { children } => {
                children.iter().any(Layout::has_svg_plots)
            }
            Layout::Widget(_) => false,
        }
    }

    /// Return a copy with the given dimensions applied
    ///
    /// Size overrides only make sense for a bare plot. For any other layout
    /// shape the request is ignored with a warning, matching the export
    /// entry points' contract.
    pub fn resized(&self, width: Option<u32>, height: Option<u32>) -> Layout {
        if width.is_none() && height.is_none() {
            return self.clone();
        }
        match self {
            Layout::Plot(plot) => {
                let mut plot = plot.clone();
                if let Some(width) = width {
                    plot.width = width;
                }
                if let Some(height) = height {
                    plot.height = height;
                }
                Layout::Plot(plot)
            }
            other => {
                warn!("export size options set on a non-plot layout; the size values will be ignored");
                other.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_svg_plots_nested() {
        let layout = Layout::column(vec![
            Layout::Plot(Plot::new("a", 100, 100)),
            Layout::row(vec![Layout::Plot(
                Plot::new("b", 100, 100).with_backend(OutputBackend::Svg),
            )]),
        ]);
        assert!(layout.has_svg_plots());

        let canvas_only = Layout::row(vec![Layout::Plot(Plot::new("c", 100, 100))]);
        assert!(!canvas_only.has_svg_plots());
    }

    #[test]
    fn test_resized_plot() {
        let layout = Layout::Plot(Plot::new("p", 640, 480));
        match layout.resized(Some(800), None) {
            Layout::Plot(plot) => {
                assert_eq!(plot.width, 800);
                assert_eq!(plot.height, 480);
            }
            _ => panic!("expected a plot"),
        }
    }

    #[test]
    fn test_resized_non_plot_is_unchanged() {
        let layout = Layout::row(vec![Layout::Plot(Plot::new("p", 640, 480))]);
        match layout.resized(Some(800), Some(600)) {
            Layout::Row { children } => match &children[0] {
                Layout::Plot(plot) => {
                    assert_eq!(plot.width, 640);
                    assert_eq!(plot.height, 480);
                }
                _ => panic!("expected a plot child"),
            },
            _ => panic!("expected a row"),
        }
    }

    #[test]
    fn test_layout_json_round_trip() {
        let layout = Layout::row(vec![
            Layout::Plot(Plot::new("p", 640, 480).with_backend(OutputBackend::Svg)),
            Layout::Widget(Widget {
                kind: "slider".to_string(),
                spec: serde_json::json!({"start": 0, "end": 10}),
            }),
        ]);
        let json = serde_json::to_string(&layout).unwrap();
        assert!(json.contains("\"type\":\"row\""));
        assert!(json.contains("\"output_backend\":\"svg\""));

        let back: Layout = serde_json::from_str(&json).unwrap();
        assert!(back.has_svg_plots());
    }
}
