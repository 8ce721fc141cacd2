//! imgsniff - print image size and resolution read from header bytes.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgsniff::{
    config::{BenchConfig, Cli, Command, OutputFormat, ProbeConfig},
    density_from_path, dimensions_from_path, format_from_path, DensityReading, ImageDimensions,
    SniffError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Probe(config) => run_probe(config),
        Command::Bench(config) => run_bench(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose { "imgsniff=debug" } else { "imgsniff=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Probe Command
// =============================================================================

/// Everything `probe` reports about one file.
#[derive(Debug, Serialize)]
struct ProbeReport<'a> {
    path: &'a Path,
    format: Option<&'static str>,
    dimensions: Option<ImageDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    density: Option<DensityReading>,
}

fn probe_file(path: &Path, with_density: bool) -> Result<ProbeReport<'_>, SniffError> {
    let format = format_from_path(path)?;
    let dimensions = dimensions_from_path(path)?;
    let density = if with_density {
        density_from_path(path)?
    } else {
        None
    };

    Ok(ProbeReport {
        path,
        format: format.map(|f| f.name()),
        dimensions,
        density,
    })
}

fn print_text(report: &ProbeReport<'_>) {
    let format = report.format.unwrap_or("unknown");
    let dimensions = report
        .dimensions
        .map_or_else(|| "-".to_string(), |d| d.to_string());

    match report.density {
        Some(density) => println!(
            "{}: {} {} {}",
            report.path.display(),
            format,
            dimensions,
            density
        ),
        None => println!("{}: {} {}", report.path.display(), format, dimensions),
    }
}

fn run_probe(config: ProbeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;

    for path in &config.paths {
        match probe_file(path, config.density) {
            Ok(report) => match config.format {
                OutputFormat::Text => print_text(&report),
                OutputFormat::Json => match serde_json::to_string(&report) {
                    Ok(line) => println!("{}", line),
                    Err(e) => {
                        eprintln!("{}: failed to encode report: {}", path.display(), e);
                        failures += 1;
                    }
                },
            },
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    debug!(files = config.paths.len(), failures, "Probe finished");

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Bench Command
// =============================================================================

fn run_bench(config: BenchConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // One untimed read so a bad file fails fast
    let dimensions = match dimensions_from_path(&config.path) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            eprintln!("{}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    info!(path = %config.path.display(), iterations = config.iterations, "Starting benchmark");

    let start = Instant::now();
    for _ in 0..config.iterations {
        if let Err(e) = dimensions_from_path(&config.path) {
            eprintln!("{}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    }
    let elapsed = start.elapsed();
    let per_call = elapsed / config.iterations;

    let dimensions = dimensions.map_or_else(|| "unknown format".to_string(), |d| d.to_string());
    println!("{}: {}", config.path.display(), dimensions);
    println!(
        "{} iterations in {:.3?} ({:.2?} per call)",
        config.iterations, elapsed, per_call
    );

    ExitCode::SUCCESS
}
