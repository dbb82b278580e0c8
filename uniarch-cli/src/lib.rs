//! # UniArch CLI
//!
//! Command-line front end for [`uniarch_core`].
//!
//! Reads one archive file from disk, infers its row width, decodes it and
//! writes the resulting table as CSV, JSON, per-column point series or a
//! short text summary.
//!
//! ```text
//! uniarch 2024-01-01-00-00-00-000.arch                  # CSV to stdout
//! uniarch data.arch --start 2024-01-01T00:00:00 -f json
//! uniarch data.arch --strategy plausibility --service-fields 0 -f summary
//! uniarch data.arch --header header.bin --columns defs.json -f series -o out.json
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-s, --strategy` - Row-width inference strategy (default: marker-periodicity)
//! - `-w, --width` - Skip inference and use a fixed raw row width
//! - `-f, --format` - Output format (default: csv)
//! - `-v` - Increase verbosity (use multiple times)

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Parser;
use uniarch_core::decoder::{DEFAULT_MAX_ROWS, DEFAULT_PERIOD_MS, DEFAULT_SERVICE_FIELDS};
use uniarch_core::source::ENTRY_TIMESTAMP_FORMAT;
use uniarch_core::InferenceStrategy;

pub mod input;
pub mod render;
pub mod run;

pub use run::{decode_file, run, Decoded};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// Always use the fixed default width
    Fixed,
    /// Score typical widths by first-row value ranges
    Plausibility,
    /// Derive the width from marker spacing
    #[default]
    MarkerPeriodicity,
}

impl From<StrategyArg> for InferenceStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Fixed => InferenceStrategy::Fixed,
            StrategyArg::Plausibility => InferenceStrategy::Plausibility,
            StrategyArg::MarkerPeriodicity => InferenceStrategy::MarkerPeriodicity,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per row, timestamp first
    #[default]
    Csv,
    /// The whole table as JSON
    Json,
    /// JSON point series, one per column
    Series,
    /// Human-readable decode summary
    Summary,
}

#[derive(Parser, Clone, Debug)]
#[command(name = "uniarch", version, about = "Decode UNI measurement archive files")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Archive file to decode
    pub input: PathBuf,

    /// Sub-stream header.bin, used to pick definitions from a keyed columns file
    #[arg(long)]
    pub header: Option<PathBuf>,

    /// Column definitions: a JSON array of {"name", "unit"} objects, or an
    /// object mapping 8-digit hex archive-definition ids to such arrays
    #[arg(short, long)]
    pub columns: Option<PathBuf>,

    /// Row-width inference strategy
    #[arg(short, long, default_value_t, value_enum)]
    pub strategy: StrategyArg,

    /// Use this raw row width instead of inferring one
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Leading service fields per row
    #[arg(long, default_value_t = DEFAULT_SERVICE_FIELDS)]
    pub service_fields: usize,

    /// Interval between rows in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_PERIOD_MS)]
    pub period_ms: u32,

    /// Maximum number of rows to decode
    #[arg(short, long, default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Time of the first row; taken from the file name when omitted
    #[arg(long, value_parser = parse_start)]
    pub start: Option<NaiveDateTime>,

    /// Do not skip a leading 00 00 00 AD marker
    #[arg(long, default_value_t = false)]
    pub no_marker_prefix: bool,

    /// Output format
    #[arg(short, long, default_value_t, value_enum)]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Accepts ISO 8601 (`2024-01-01T00:00:00`, optional fraction), a space
/// separated variant, or the archive entry layout (`2024-01-01-00-00-00-000`).
pub fn parse_start(s: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        ENTRY_TIMESTAMP_FORMAT,
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Invalid start time: {}", s))
}
