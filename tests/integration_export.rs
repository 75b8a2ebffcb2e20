//! End-to-end export tests against a real headless Chrome session.
//!
//! The layouts are rendered by a stub plot runtime that honors the page
//! contract: it registers a document, draws each plot leaf into the root,
//! and fires the idle signal once drawing finishes.

use std::time::Duration;

use plotshot::export::{export_png_with, export_svgs_with, screenshot_as_png, ExportOptions};
use plotshot::layout::{Layout, OutputBackend, Plot};
use plotshot::{new_session, Error, Resources, SessionConfig};

const STUB_RUNTIME: &str = r#"
window.Plotshot = {
  documents: [],
  embed: {
    render: function(spec, root) {
      var doc = {
        is_idle: false,
        idle: { _callbacks: [], connect: function(cb) { this._callbacks.push(cb); } }
      };
      window.Plotshot.documents.push(doc);
      var host = document.createElement("div");
      root.appendChild(host);
      (function draw(node, el) {
        if (node.type === "plot") {
          if (node.output_backend === "svg") {
            var svg = document.createElementNS("http://www.w3.org/2000/svg", "svg");
            svg.setAttribute("width", node.width);
            svg.setAttribute("height", node.height);
            var rect = document.createElementNS("http://www.w3.org/2000/svg", "rect");
            rect.setAttribute("width", node.width);
            rect.setAttribute("height", node.height);
            rect.setAttribute("fill", "steelblue");
            svg.appendChild(rect);
            el.appendChild(svg);
          } else {
            var canvas = document.createElement("canvas");
            canvas.width = node.width;
            canvas.height = node.height;
            var ctx = canvas.getContext("2d");
            ctx.fillStyle = "tomato";
            ctx.fillRect(0, 0, node.width, node.height);
            el.appendChild(canvas);
          }
        } else if (node.children) {
          var box = document.createElement("div");
          box.style.display = node.type === "row" ? "flex" : "block";
          el.appendChild(box);
          node.children.forEach(function(child) { draw(child, box); });
        }
      })(spec, host);
      doc.is_idle = true;
      doc.idle._callbacks.forEach(function(cb) { cb(); });
    }
  }
};
"#;

fn stub_options() -> ExportOptions {
    ExportOptions::default().with_resources(Resources::inline(STUB_RUNTIME))
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_export_png_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("plot.png");
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::Plot(Plot::new("integration", 400, 300));
    let options = stub_options().with_filename(&target);

    let path = export_png_with(&layout, &mut session, &options).expect("Failed to export PNG");

    assert!(path.is_absolute());
    let bytes = std::fs::read(&path).expect("read output");
    assert!(bytes.len() > 100, "PNG data seems too small");
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_screenshot_dimensions_track_the_plot() {
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::Plot(Plot::new("sized", 640, 480));
    let image =
        screenshot_as_png(&layout, &mut session, &stub_options()).expect("Failed to screenshot");

    assert!(image.width() > 0);
    assert!(image.height() > 0);
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_export_svgs_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("plot.svg");
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::row(vec![
        Layout::Plot(Plot::new("left", 200, 200).with_backend(OutputBackend::Svg)),
        Layout::Plot(Plot::new("right", 200, 200).with_backend(OutputBackend::Svg)),
    ]);
    let options = stub_options().with_filename(&target);

    let written = export_svgs_with(&layout, &mut session, &options).expect("Failed to export SVGs");

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dir.path().join("plot.svg"));
    assert_eq!(written[1], dir.path().join("plot_1.svg"));
    for path in &written {
        let svg = std::fs::read_to_string(path).expect("read svg");
        assert!(svg.starts_with("<svg"), "unexpected svg content: {}", svg);
    }
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_canvas_only_layout_produces_no_svgs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("plot.svg");
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::Plot(Plot::new("canvas", 200, 200));
    let options = stub_options().with_filename(&target);

    let written = export_svgs_with(&layout, &mut session, &options).expect("Failed to export");
    assert!(written.is_empty());
    assert!(!target.exists());
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_runtime_served_from_http() {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr();
    std::thread::spawn(move || {
        // a single request for the runtime bundle is expected
        if let Ok(request) = server.recv() {
            let response = tiny_http::Response::from_string(STUB_RUNTIME).with_header(
                "Content-Type: application/javascript"
                    .parse::<tiny_http::Header>()
                    .unwrap(),
            );
            let _ = request.respond(response);
        }
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("plot.png");
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::Plot(Plot::new("cdn", 320, 240));
    let options = ExportOptions::default()
        .with_resources(Resources::cdn(format!("http://{}/plotshot.min.js", addr)))
        .with_filename(&target);

    let path = export_png_with(&layout, &mut session, &options).expect("Failed to export PNG");
    assert!(path.exists());
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_missing_runtime_is_fatal() {
    let mut session = new_session(SessionConfig::default()).expect("Failed to create session");

    let layout = Layout::Plot(Plot::new("broken", 200, 200));
    let options = ExportOptions::default()
        .with_resources(Resources::inline("// no runtime here"))
        .with_timeout(Duration::from_secs(1));

    let err = screenshot_as_png(&layout, &mut session, &options).unwrap_err();
    assert!(matches!(err, Error::RuntimeNotLoaded(_)));
}
