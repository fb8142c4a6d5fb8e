//! Thiessen CLI - yearly territory maps from nest-box occupancy

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use geo::{Area, BoundingRect, MultiPolygon};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use thiessen_algorithms::territory::CapPolicy;
use thiessen_algorithms::vector::hectares;
use thiessen_colormap::ColorScheme;
use thiessen_core::io::{read_features, RawTable};
use thiessen_pipeline::{
    normalize_boundary, normalize_points, run_pipeline, GroupSummary, NormalizedPoints,
    PipelineConfig, RunSummary,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "thiessen")]
#[command(author, version, about = "Yearly Thiessen territories clipped to a study boundary", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build territories, maps and layers for every group
    Run {
        #[command(flatten)]
        inputs: Inputs,
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Summarize the inputs without writing anything
    Info {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Args)]
struct Inputs {
    /// Point table (CSV with header)
    #[arg(short, long)]
    points: PathBuf,
    /// Study boundary (GeoJSON)
    #[arg(short, long)]
    boundary: Option<PathBuf>,
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Flags that take precedence over the configuration file
#[derive(Args, Default)]
struct Overrides {
    /// EPSG code of the planar CRS used for all computation
    #[arg(long)]
    epsg: Option<u32>,
    /// EPSG code assumed for a boundary without a declared CRS
    #[arg(long)]
    boundary_epsg: Option<u32>,
    /// Area cap in hectares
    #[arg(long)]
    cap: Option<f64>,
    /// Cap policy: after_clip, before_clip, disabled
    #[arg(long)]
    cap_policy: Option<CapPolicy>,
    /// Keep the combined layer uncapped
    #[arg(long)]
    uncapped_combined: bool,
    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Color scheme: viridis, yellow_green, yellow_orange_brown, grayscale
    #[arg(long)]
    scheme: Option<ColorScheme>,
    /// Skip PNG rendering
    #[arg(long)]
    no_images: bool,
    /// Treat assignment anomalies as errors
    #[arg(long)]
    strict: bool,
}

impl Overrides {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(epsg) = self.epsg {
            config.canonical_epsg = epsg;
        }
        if let Some(epsg) = self.boundary_epsg {
            config.boundary_epsg = epsg;
        }
        if let Some(cap) = self.cap {
            config.cap_ha = cap;
        }
        if let Some(policy) = self.cap_policy {
            config.cap_policy = policy;
        }
        if self.uncapped_combined {
            config.cap_in_combined = false;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(scheme) = self.scheme {
            config.render.scheme = scheme;
        }
        if self.no_images {
            config.render.enabled = false;
        }
        if self.strict {
            config.strict_assignment = true;
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn group_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_points(path: &Path, config: &PipelineConfig) -> Result<NormalizedPoints> {
    let pb = spinner("Reading points...")?;
    let table = RawTable::read_csv(path)
        .with_context(|| format!("Failed to read point table {}", path.display()))?;
    let points = normalize_points(&table, &config.columns).context("Failed to normalize points")?;
    pb.finish_and_clear();
    info!(
        "Points: {} rows, {} kept, {} excluded",
        points.report.rows,
        points.report.kept,
        points.report.excluded()
    );
    Ok(points)
}

fn read_boundary(path: &Path, config: &PipelineConfig) -> Result<MultiPolygon<f64>> {
    let source = read_features(path)
        .with_context(|| format!("Failed to read boundary {}", path.display()))?;
    normalize_boundary(&source, &config.boundary_crs(), &config.canonical_crs())
        .context("Failed to prepare boundary")
}

fn print_summary(summary: &RunSummary, out: &Path, elapsed: std::time::Duration) {
    println!("Groups:");
    for GroupSummary { group, cells, anomalies, total_area_ha } in &summary.groups {
        print!("  {}: {} cells, {:.2} ha", group, cells, total_area_ha);
        if *anomalies > 0 {
            print!(", {} anomalies", anomalies);
        }
        println!();
    }
    if !summary.skipped.is_empty() {
        let skipped: Vec<String> = summary.skipped.iter().map(i32::to_string).collect();
        println!("Skipped: {}", skipped.join(", "));
    }
    println!("Output saved to: {}", out.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run(inputs: &Inputs, out: &Path, overrides: &Overrides) -> Result<()> {
    let config = load_config(inputs.config.as_deref(), overrides)?;
    let boundary_path = inputs
        .boundary
        .as_deref()
        .context("A boundary file is required for `run` (--boundary)")?;

    let start = Instant::now();
    let points = read_points(&inputs.points, &config)?;
    let boundary = read_boundary(boundary_path, &config)?;
    let groups = points.by_group();

    let pb = group_bar(groups.len())?;
    let result = run_pipeline(&config, &groups, &boundary, out, |group| {
        pb.set_message(format!("year {}", group));
        pb.inc(1);
    });
    pb.finish_and_clear();
    let mut summary = result.with_context(|| format!("Failed to produce outputs in {}", out.display()))?;
    summary.points = points.report;

    print_summary(&summary, out, start.elapsed());
    Ok(())
}

fn describe(inputs: &Inputs) -> Result<()> {
    let config = load_config(inputs.config.as_deref(), &Overrides::default())?;
    let points = read_points(&inputs.points, &config)?;
    let report = points.report;

    println!("Points: {}", inputs.points.display());
    println!("  Rows: {}", report.rows);
    println!("  Kept: {}", report.kept);
    println!(
        "  Excluded: {} (bad coordinates {}, bad group {}, missing location {}, duplicates {})",
        report.excluded(),
        report.bad_coordinates,
        report.bad_group,
        report.missing_location,
        report.duplicates
    );
    println!("\nGroups:");
    for (group, records) in points.by_group() {
        println!("  {}: {} points", group, records.len());
    }

    if let Some(path) = &inputs.boundary {
        let boundary = read_boundary(path, &config)?;
        println!("\nBoundary: {}", path.display());
        println!("  CRS: {}", config.canonical_crs());
        println!("  Parts: {}", boundary.0.len());
        println!("  Area: {:.2} ha", hectares(boundary.unsigned_area()));
        if let Some(rect) = boundary.bounding_rect() {
            println!(
                "  Extent: ({:.1}, {:.1}) - ({:.1}, {:.1})",
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        Commands::Run { inputs, out, overrides } => run(inputs, out, overrides),
        Commands::Info { inputs } => describe(inputs),
    }
}
