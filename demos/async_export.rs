//! Example demonstrating the worker-backed async export facade

use plotshot::export::ExportOptions;
use plotshot::layout::{Layout, OutputBackend, Plot};
use plotshot::AsyncExporter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Plotshot - Async Export Example\n");

    let exporter = AsyncExporter::new(None).await?;
    println!("Exporter created successfully!\n");

    let png_layout = Layout::Plot(Plot::new("raster", 640, 480));
    let svg_layout = Layout::row(vec![
        Layout::Plot(Plot::new("a", 320, 240).with_backend(OutputBackend::Svg)),
        Layout::Plot(Plot::new("b", 320, 240).with_backend(OutputBackend::Svg)),
    ]);

    println!("Exporting PNG...");
    let png_path = exporter
        .export_png(&png_layout, &ExportOptions::default().with_filename("demo_async.png"))
        .await?;
    println!("Wrote {}", png_path.display());

    println!("Exporting SVGs...");
    let svg_paths = exporter
        .export_svgs(&svg_layout, &ExportOptions::default().with_filename("demo_async.svg"))
        .await?;
    for path in &svg_paths {
        println!("Wrote {}", path.display());
    }

    exporter.close().await?;
    Ok(())
}
