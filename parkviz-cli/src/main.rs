mod output;
mod reports;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use output::{ReportSink, default_output_dir, write_batch_files};
use parkviz_core::{BatchConfig, BatchOutput, GalleryEngine};
use source::FsSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// Markdown tables per group
    Markdown,
    /// The batch manifest as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "parkviz", version)]
#[command(
    about = "Group park tree-removal results, tag duplicates, and plan composite renders"
)]
struct Args {
    /// Result files or directories of result files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Vote fraction (0..1) a tree needs to enter a composite
    #[arg(long)]
    threshold: Option<f64>,

    /// Skip the COMPOSITE render per hint cohort
    #[arg(long)]
    no_composite: bool,

    /// JSON batch configuration; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for metadata.json and render_requests.json
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write batch files to a timestamped directory when --out-dir is absent
    #[arg(long)]
    write: bool,

    /// Exit with status 1 when any file failed to parse
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let output = run(&args)?;

    if args.strict && !output.failures.is_empty() {
        log::error!("{} file(s) failed to parse", output.failures.len());
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run(args: &Args) -> Result<BatchOutput> {
    let config = load_config(args)?;
    log::debug!(
        "threshold {:.2}, composites {}",
        config.threshold.value(),
        config.composite
    );

    let engine = GalleryEngine::new(FsSource::new(args.inputs.clone()), config);
    let now = chrono::Local::now();
    let output = engine.run()?.with_generated_at(now.to_rfc3339());

    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| args.write.then(|| default_output_dir(&now)));
    let written = match out_dir {
        Some(dir) => write_batch_files(&dir, &output)?,
        None => Vec::new(),
    };

    write_report(args, &output, &written)?;
    Ok(output)
}

fn load_config(args: &Args) -> Result<BatchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            BatchConfig::from_json(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => BatchConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    if args.no_composite {
        config = config.with_composite(false);
    }
    Ok(config)
}

fn write_report(args: &Args, output: &BatchOutput, written: &[PathBuf]) -> Result<()> {
    if args.output.is_some() {
        colored::control::set_override(false);
    }
    let mut sink = ReportSink::open(args.output.as_deref())?;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut sink, output)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(&mut sink, output, written)?;
        }
        ReportFormat::Console => {
            reports::generate_console_report(&mut sink, output, written)?;
        }
    }
    sink.finish()
}
