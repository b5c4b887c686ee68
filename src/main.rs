use anyhow::Context;
use clap::{Parser, Subcommand};
use palette_dither::Palette;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ditherkit::catalog::{self, MatrixKind};
use ditherkit::config::{self, AppConfig, MetricKind};
use ditherkit::{image_io, render};

#[derive(Parser)]
#[command(name = "ditherkit")]
#[command(about = "Ditherkit - palette quantization and dithering for PNG images")]
struct Cli {
    /// Config file (defaults to $DITHERKIT_CONFIG, then the built-in config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List algorithms and configured palettes
    List,
    /// Dither a PNG to an indexed PNG
    Dither {
        /// Input PNG file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Algorithm name (see `ditherkit list`)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Palette name from the config
        #[arg(short, long, conflicts_with = "colors")]
        palette: Option<String>,

        /// Palette as comma-separated hex colors (e.g. "#000000,#FFFFFF,#FF0000")
        #[arg(long)]
        colors: Option<String>,

        /// Error / threshold strength in [0, 1]
        #[arg(short, long)]
        strength: Option<f32>,

        /// Scan every row left to right
        #[arg(long)]
        no_serpentine: bool,

        /// Color distance
        #[arg(long, value_enum)]
        metric: Option<MetricKind>,
    },
    /// Print a threshold rank matrix
    Matrix {
        /// Matrix side length
        #[arg(short, long)]
        size: usize,

        #[arg(short, long, value_enum, default_value = "bayer")]
        kind: MatrixKind,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ditherkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::List => {
            run_list_command(&config);
            Ok(())
        }
        Commands::Dither {
            input,
            output,
            algorithm,
            palette,
            colors,
            strength,
            no_serpentine,
            metric,
        } => {
            let options = DitherOptions {
                algorithm: algorithm.unwrap_or_else(|| config.default_algorithm.clone()),
                strength: strength.unwrap_or(config.strength),
                serpentine: config.serpentine && !no_serpentine,
                metric: metric.unwrap_or(config.metric),
            };
            let palette = resolve_palette(&config, palette.as_deref(), colors.as_deref())?;
            run_dither_command(&config, &input, &output, &palette, &options)
        }
        Commands::Matrix { size, kind } => run_matrix_command(size, kind),
    }
}

struct DitherOptions {
    algorithm: String,
    strength: f32,
    serpentine: bool,
    metric: MetricKind,
}

fn resolve_palette(config: &AppConfig, name: Option<&str>, colors: Option<&str>) -> anyhow::Result<Palette> {
    if let Some(colors) = colors {
        return config::parse_colors(colors).with_context(|| format!("Invalid --colors {colors:?}"));
    }
    let name = name.unwrap_or(&config.default_palette);
    Ok(config.palette(name)?)
}

fn run_list_command(config: &AppConfig) {
    println!("Algorithms:");
    for entry in catalog::entries() {
        let mode = if entry.sequential { "sequential" } else { "parallel" };
        println!("  {:<22} {:<11} {}", entry.name, mode, entry.description);
    }

    println!();
    println!("Palettes:");
    for name in config.palette_names() {
        let colors = config.palettes.get(name).map(|p| p.colors.join(" ")).unwrap_or_default();
        let marker = if name == config.default_palette { "*" } else { " " };
        println!(" {marker}{:<12} {}", name, colors);
    }
}

fn run_dither_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    palette: &Palette,
    options: &DitherOptions,
) -> anyhow::Result<()> {
    let algorithm = catalog::resolve(&options.algorithm, options.strength, options.serpentine)?;

    let image = image_io::read_png(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let start = Instant::now();
    let indices = render::dither_rgba(
        &image,
        &algorithm,
        &options.metric,
        palette,
        config.tiling.rows_per_slice,
    )?;
    let elapsed = start.elapsed();

    image_io::write_indexed_png(output, &indices, image.width, image.height, palette)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        width = image.width,
        height = image.height,
        algorithm = %options.algorithm,
        colors = palette.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Wrote dithered image"
    );
    Ok(())
}

fn run_matrix_command(size: usize, kind: MatrixKind) -> anyhow::Result<()> {
    let matrix = kind.build(size)?;
    let width = (size * size).saturating_sub(1).to_string().len();
    for y in 0..size {
        let row: Vec<String> = (0..size).map(|x| format!("{:>width$}", matrix.rank(x, y))).collect();
        println!("{}", row.join(" "));
    }
    Ok(())
}
