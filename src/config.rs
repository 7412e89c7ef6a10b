// Configuration for caller analysis runs
//
// Loaded from TOML; every field has a default so an empty file is valid.
// Command-line flags are applied on top by the binary.

use crate::report::ReportFormat;
use crate::source::FrameRange;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one caller analysis run
///
/// # Example
/// ```
/// use marker_callers::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.marker, "GC.Alloc");
/// assert!(!config.clip_trailing_frame);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Marker whose callers are counted
    pub marker: String,

    /// Report file, relative to the working directory unless absolute
    pub output: PathBuf,

    pub format: ReportFormat,

    /// Skip the last frame of the source range when it holds more than one frame
    ///
    /// For front-ends whose newest frame is still being written. Default: false
    pub clip_trailing_frame: bool,

    /// Log every negative-duration sample, not just the first in the run
    ///
    /// Default: false (one warning per run avoids flooding the log)
    pub log_all_invalid_durations: bool,

    /// Override the first frame index reported by the source
    pub first_frame: Option<i64>,

    /// Override the last frame index reported by the source
    pub last_frame: Option<i64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            marker: "GC.Alloc".to_string(),
            output: PathBuf::from("callinfo.csv"),
            format: ReportFormat::Csv,
            clip_trailing_frame: false,
            log_all_invalid_durations: false,
            first_frame: None,
            last_frame: None,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// # Example TOML
    /// ```toml
    /// marker = "GC.Alloc"
    /// output = "callinfo.csv"
    /// format = "csv"
    /// clip_trailing_frame = false
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML analysis configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.marker.trim().is_empty() {
            return Err("marker must not be empty".to_string());
        }

        if self.output.as_os_str().is_empty() {
            return Err("output path must not be empty".to_string());
        }

        if let (Some(first), Some(last)) = (self.first_frame, self.last_frame) {
            if first > last {
                return Err(format!(
                    "first_frame must be <= last_frame, got {} > {}",
                    first, last
                ));
            }
        }

        Ok(())
    }

    /// Frame range to assemble, given the range the source reports
    ///
    /// Overrides replace the matching end; clipping applies afterwards.
    pub fn resolve_range(&self, source: FrameRange) -> FrameRange {
        let range = FrameRange::new(
            self.first_frame.unwrap_or(source.first),
            self.last_frame.unwrap_or(source.last),
        );
        if self.clip_trailing_frame {
            range.clip_trailing()
        } else {
            range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output, PathBuf::from("callinfo.csv"));
        assert_eq!(config.format, ReportFormat::Csv);
        assert!(!config.log_all_invalid_durations);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalysisConfig::from_toml_str(
            r#"
marker = "Physics.Simulate"
format = "json"
clip_trailing_frame = true
first_frame = 10
"#,
        )
        .unwrap();
        assert_eq!(config.marker, "Physics.Simulate");
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.clip_trailing_frame);
        assert_eq!(config.first_frame, Some(10));
        assert_eq!(config.last_frame, None);
        assert_eq!(config.output, PathBuf::from("callinfo.csv"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(AnalysisConfig::from_toml_str("marker = ").is_err());
        assert!(AnalysisConfig::from_toml_str("format = \"xml\"").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "marker = \"Render\"").unwrap();
        let config = AnalysisConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.marker, "Render");
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = AnalysisConfig::from_toml("/nonexistent/callers.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AnalysisConfig {
            marker: "  ".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            output: PathBuf::new(),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            first_frame: Some(9),
            last_frame: Some(3),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_range() {
        let source = FrameRange::new(0, 9);
        assert_eq!(AnalysisConfig::default().resolve_range(source), FrameRange::new(0, 9));

        let config = AnalysisConfig {
            clip_trailing_frame: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.resolve_range(source), FrameRange::new(0, 8));

        let config = AnalysisConfig {
            first_frame: Some(4),
            ..AnalysisConfig::default()
        };
        assert_eq!(config.resolve_range(source), FrameRange::new(4, 9));
    }
}
