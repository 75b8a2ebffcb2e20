use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "plotshot",
    version,
    about = "Export web-rendered plot documents to static PNG or SVG files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a serialized layout document
    Export {
        /// Path to a layout JSON document
        layout: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Png)]
        format: Format,

        /// Output file (derived from the layout filename when omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Width override, applied only to bare-plot layouts
        #[arg(long)]
        width: Option<u32>,

        /// Height override, applied only to bare-plot layouts
        #[arg(long)]
        height: Option<u32>,

        /// Wait budget in seconds for runtime load and render completion
        #[arg(long, default_value_t = 5)]
        timeout: u64,

        /// URL of the plot runtime bundle (defaults to the pinned CDN build)
        #[arg(long)]
        resources: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Svg,
}

#[cfg(feature = "cdp")]
fn main() -> anyhow::Result<()> {
    use plotshot::export::{export_png_with, export_svgs_with, ExportOptions};
    use plotshot::{Layout, Resources, SessionConfig};

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            layout,
            format,
            out,
            width,
            height,
            timeout,
            resources,
        } => {
            let text = std::fs::read_to_string(&layout)?;
            let doc: Layout = serde_json::from_str(&text)?;

            if format == Format::Svg && !doc.has_svg_plots() {
                eprintln!(
                    "note: {} has no svg-backend plots; no files would be produced",
                    layout.display()
                );
                return Ok(());
            }

            let ext = match format {
                Format::Png => "png",
                Format::Svg => "svg",
            };
            let filename = out.unwrap_or_else(|| layout.with_extension(ext));

            let mut options = ExportOptions::default()
                .with_filename(filename)
                .with_timeout(Duration::from_secs(timeout));
            options.width = width;
            options.height = height;
            if let Some(js_url) = resources {
                options = options.with_resources(Resources::cdn(js_url));
            }

            let mut session = plotshot::new_session(SessionConfig::default())?;

            match format {
                Format::Png => {
                    let path = export_png_with(&doc, &mut session, &options)?;
                    println!("wrote {}", path.display());
                }
                Format::Svg => {
                    let paths = export_svgs_with(&doc, &mut session, &options)?;
                    if paths.is_empty() {
                        eprintln!("no svg output was produced");
                    }
                    for path in paths {
                        println!("wrote {}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cdp"))]
fn main() {
    eprintln!("the plotshot CLI requires the `cdp` feature");
    std::process::exit(1);
}
