//! Basic example demonstrating a PNG export through an explicit session

use plotshot::export::{export_png_with, ExportOptions};
use plotshot::layout::{Layout, Plot};
use plotshot::{SessionConfig, Viewport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Plotshot - PNG Export Example\n");

    // Configure the session
    let config = SessionConfig {
        viewport: Viewport {
            width: 1280,
            height: 720,
        },
        timeout_ms: 30000,
    };

    println!("Creating session with config:");
    println!(
        "  Viewport: {}x{}",
        config.viewport.width, config.viewport.height
    );
    println!("  Timeout: {}ms\n", config.timeout_ms);

    let mut session = plotshot::new_session(config)?;
    println!("Session created successfully!\n");

    // A small layout: one plot over a row of two
    let layout = Layout::column(vec![
        Layout::Plot(Plot::new("overview", 640, 240)),
        Layout::row(vec![
            Layout::Plot(Plot::new("left detail", 320, 240)),
            Layout::Plot(Plot::new("right detail", 320, 240)),
        ]),
    ]);

    println!("Exporting layout...");
    let options = ExportOptions::default().with_filename("demo_plot.png");
    let path = export_png_with(&layout, &mut session, &options)?;
    println!("Wrote {}", path.display());

    Ok(())
}
