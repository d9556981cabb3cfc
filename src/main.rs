//! ProUni Chart - scholarship grants by sex per year
//!
//! Reads ProUni CSV extracts, keeps STEM grants in the Baixada Santista
//! municipalities and charts male/female counts per year.

mod charts;
mod config;
mod data;
mod gui;
mod pipeline;
mod stats;

use anyhow::{Context, Result};
use charts::{ChartModel, StaticChartRenderer};
use clap::Parser;
use config::{ChartLayout, DatasetShape, PipelineConfig};
use data::CategoryVocabulary;
use pipeline::Pipeline;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "prouni-chart", version, about = "Chart ProUni STEM grants by sex per year")]
struct Cli {
    /// Built-in dataset shape
    #[arg(long, value_enum, default_value_t = DatasetShape::Pda)]
    shape: DatasetShape,

    /// JSON file describing a custom dataset shape (overrides --shape)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Field-of-study keywords, one per line
    #[arg(long, value_name = "FILE", default_value = "cursos_stem.txt")]
    categories: PathBuf,

    /// Directory searched for dataset files
    #[arg(long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Bar layout (defaults to the shape's layout)
    #[arg(long, value_enum)]
    layout: Option<ChartLayout>,

    /// Also write the chart as SVG
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Do not open the chart window
    #[arg(long)]
    no_window: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{:?}", cli);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading shape config {}", path.display()))?,
        None => cli.shape.config(),
    };
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }

    let vocabulary = CategoryVocabulary::load(&cli.categories)?;
    info!(
        "{} category keyword(s) from {}",
        vocabulary.len(),
        cli.categories.display()
    );

    let pipeline = Pipeline::new(config, vocabulary);
    let report = pipeline
        .run(&cli.dir)
        .with_context(|| format!("running the {} pipeline", pipeline.config().name))?;

    info!(
        "{} row(s) read, {} kept, {} grant(s) grouped",
        report.rows_read,
        report.rows_kept,
        report.counts.total()
    );
    if report.counts.is_empty() {
        warn!("No grants matched the filters, the chart will be empty");
    }

    let series = report.counts.series();
    let model = ChartModel::build(&series, pipeline.config().layout);

    if let Some(path) = &cli.save {
        StaticChartRenderer::render_svg(&model, path, (1000, 600))?;
        info!("Chart written to {}", path.display());
    }

    if cli.no_window {
        return Ok(());
    }

    let files = report
        .files
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    gui::run(pipeline.config().name.clone(), files, series, model)
        .map_err(|e| anyhow::anyhow!("chart window failed: {e}"))
}
