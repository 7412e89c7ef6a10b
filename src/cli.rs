//! CLI argument parsing for marker-callers

use crate::config::AnalysisConfig;
use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marker-callers")]
#[command(version)]
#[command(about = "Find which call sites trigger a profiler marker", long_about = None)]
pub struct Cli {
    /// Capture file (JSON) to analyze
    #[arg(value_name = "CAPTURE")]
    pub capture: PathBuf,

    /// Marker whose callers are counted (default: GC.Alloc)
    #[arg(short, long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Report file to write (default: callinfo.csv)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum)]
    pub format: Option<ReportFormat>,

    /// Load analysis settings from a TOML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// First frame index to analyze
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub first: Option<i64>,

    /// Last frame index to analyze
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub last: Option<i64>,

    /// Skip the trailing frame of the capture range (for captures still being written)
    #[arg(long = "clip-trailing")]
    pub clip_trailing: bool,

    /// Log every negative-duration sample instead of only the first
    #[arg(long = "log-all-invalid")]
    pub log_all_invalid: bool,

    /// Print a caller summary table to stderr
    #[arg(short, long)]
    pub summary: bool,

    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a base configuration
    pub fn apply_to(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(marker) = &self.marker {
            config.marker = marker.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.first.is_some() {
            config.first_frame = self.first;
        }
        if self.last.is_some() {
            config.last_frame = self.last;
        }
        if self.clip_trailing {
            config.clip_trailing_frame = true;
        }
        if self.log_all_invalid {
            config.log_all_invalid_durations = true;
        }
        config
    }
}
