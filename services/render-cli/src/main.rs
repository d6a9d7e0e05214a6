//! Command-line map renderer.
//!
//! Renders a GeoJSON dataset with a JSON style into a PNG for one extent.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use map_common::{default_style_for, Color, Extent, MemoryFeatureSource, SrsId, StyleConfig, StyleDefinition};
use renderer::{sys_info, MapRenderer, RendererConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mapserver-render")]
#[command(about = "Render vector features to a PNG map image")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one extent to a PNG file
    Render(RenderArgs),

    /// Print component versions and supported spatial references
    Info,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// GeoJSON dataset
    #[arg(short, long)]
    input: PathBuf,

    /// SRS of the dataset (default: the file's `crs` member, then EPSG:4326)
    #[arg(long)]
    source_srs: Option<String>,

    /// Style JSON file (a single style, or a style document with --style-name)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Style to pick from a style document
    #[arg(long, requires = "style")]
    style_name: Option<String>,

    /// Fill color of the default style when no --style is given
    #[arg(long, default_value = "#c80000")]
    color: String,

    /// Output SRS
    #[arg(long, default_value = "EPSG:4326")]
    srs: String,

    /// Extent in output SRS units: min_x,min_y,max_x,max_y
    #[arg(long, allow_hyphen_values = true)]
    bbox: Extent,

    #[arg(long, default_value = "256")]
    width: u32,

    #[arg(long, default_value = "256")]
    height: u32,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Renderer configuration YAML
    #[arg(short, long, env = "MAPSERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Font list, overrides the configuration
    #[arg(long)]
    fontset: Option<PathBuf>,

    /// Disable anti-aliasing
    #[arg(long)]
    no_anti_alias: bool,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json)?;

    match cli.command {
        Command::Render(args) => render(args),
        Command::Info => {
            for (component, version) in sys_info() {
                println!("{:<20} {}", component, version);
            }
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let config = load_config(&args)?;
    let renderer = MapRenderer::new(config).context("Failed to initialize renderer")?;

    let source_srs = args
        .source_srs
        .as_deref()
        .map(SrsId::parse)
        .transpose()
        .context("Invalid --source-srs")?;
    let source = MemoryFeatureSource::from_geojson_file(&args.input, source_srs)
        .with_context(|| format!("Failed to load features from {}", args.input.display()))?;
    info!(input = %args.input.display(), features = source.len(), "Loaded dataset");

    let style = load_style(&args, &source)?;
    let request = renderer
        .render_request_str(Arc::new(style), Arc::new(source), &args.srs)
        .context("Failed to open render request")?;

    let start = Instant::now();
    let image = request
        .render_extent(&args.bbox, (args.width, args.height))
        .context("Rendering failed")?;
    let png = image.to_png()?;

    std::fs::write(&args.output, &png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        width = args.width,
        height = args.height,
        bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Wrote map image"
    );
    Ok(())
}

/// Configuration file (or defaults), then environment, then flags.
fn load_config(args: &RenderArgs) -> Result<RendererConfig> {
    let config = match &args.config {
        Some(path) => RendererConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RendererConfig::default(),
    };
    let mut config = config.with_overrides(|name| std::env::var(name).ok())?;

    if let Some(fontset) = &args.fontset {
        config.fontset = fontset.clone();
    }
    if args.no_anti_alias {
        config.anti_alias = false;
    }
    Ok(config)
}

fn load_style(args: &RenderArgs, source: &MemoryFeatureSource) -> Result<StyleDefinition> {
    let Some(path) = &args.style else {
        return Ok(default_style_for(source, parse_color(&args.color)?));
    };

    match &args.style_name {
        Some(name) => {
            let document = StyleConfig::from_file(path)
                .with_context(|| format!("Failed to load styles from {}", path.display()))?;
            document
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("Style '{}' not found in {}", name, path.display()))
        }
        None => StyleDefinition::from_file(path)
            .with_context(|| format!("Failed to load style {}", path.display())),
    }
}

fn parse_color(text: &str) -> Result<(u8, u8, u8)> {
    let (r, g, b, _) = Color::Hex(text.to_string())
        .try_to_rgba()
        .ok_or_else(|| anyhow!("Invalid color '{}'", text))?;
    Ok((r, g, b))
}
