//! Error taxonomy for caller analysis runs
//!
//! Only the conditions that stop a run are error values. Per-thread and
//! per-sample problems (corrupted thread captures, negative sample durations,
//! unclosed depth stacks) are logged and counted in
//! [`AssemblyDiagnostics`](crate::model::AssemblyDiagnostics) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No trace source (or no capturable frame range) is available
    #[error("no trace source available")]
    SourceUnavailable,

    /// The requested marker name never appears in the capture
    #[error("marker '{0}' not found in capture")]
    TargetNameNotFound(String),

    /// A cancellation flag was raised between frames
    #[error("analysis cancelled after {frames_processed} frames")]
    Cancelled { frames_processed: usize },

    #[error("failed to write report to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Whether the host should treat this as a silent abort (no report, no failure)
    pub fn is_silent_abort(&self) -> bool {
        matches!(
            self,
            AnalysisError::SourceUnavailable | AnalysisError::TargetNameNotFound(_)
        )
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_aborts() {
        assert!(AnalysisError::SourceUnavailable.is_silent_abort());
        assert!(AnalysisError::TargetNameNotFound("GC.Alloc".to_string()).is_silent_abort());
        assert!(!AnalysisError::Cancelled { frames_processed: 3 }.is_silent_abort());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::TargetNameNotFound("GC.Alloc".to_string());
        assert_eq!(err.to_string(), "marker 'GC.Alloc' not found in capture");

        let err = AnalysisError::Io {
            path: PathBuf::from("callinfo.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("callinfo.csv"));
    }
}
