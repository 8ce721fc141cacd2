//! Command-line configuration for the `imgsniff` binary.
//!
//! Options can also be set through environment variables with the
//! `IMGSNIFF_` prefix:
//!
//! - `IMGSNIFF_DENSITY` - Also report density (default: false)
//! - `IMGSNIFF_FORMAT` - Output format, `text` or `json` (default: text)
//! - `IMGSNIFF_ITERATIONS` - Benchmark iterations (default: 10000)

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

// =============================================================================
// Default Values
// =============================================================================

/// Default number of benchmark iterations.
pub const DEFAULT_BENCH_ITERATIONS: u32 = 10_000;

/// Upper bound on benchmark iterations.
pub const MAX_BENCH_ITERATIONS: u32 = 10_000_000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgsniff - read image size and resolution from header bytes.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgsniff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print format, dimensions and optionally density of image files.
    Probe(ProbeConfig),

    /// Time repeated dimension reads of one file.
    Bench(BenchConfig),
}

/// How `probe` prints its results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per file
    #[default]
    Text,

    /// One JSON object per file
    Json,
}

// =============================================================================
// Probe
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ProbeConfig {
    /// Image files to inspect.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Also read horizontal and vertical density.
    #[arg(short, long, default_value_t = false, env = "IMGSNIFF_DENSITY")]
    pub density: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "IMGSNIFF_FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ProbeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.paths.is_empty() {
            return Err("At least one path is required".to_string());
        }

        if let Some(empty) = self.paths.iter().position(|p| p.as_os_str().is_empty()) {
            return Err(format!("Path #{} is empty", empty + 1));
        }

        Ok(())
    }
}

// =============================================================================
// Bench
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct BenchConfig {
    /// Image file to read repeatedly.
    pub path: PathBuf,

    /// Number of reads to time.
    #[arg(short = 'n', long, default_value_t = DEFAULT_BENCH_ITERATIONS, env = "IMGSNIFF_ITERATIONS")]
    pub iterations: u32,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl BenchConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Path is required".to_string());
        }

        if self.iterations == 0 || self.iterations > MAX_BENCH_ITERATIONS {
            return Err(format!(
                "iterations must be between 1 and {}",
                MAX_BENCH_ITERATIONS
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
