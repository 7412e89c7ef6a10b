//! End-to-end caller analysis
//!
//! Resolves the frame range, assembles the trace, looks up the target marker
//! and attributes its occurrences to callers. A missing source or an unknown
//! marker aborts before any frame is scanned.

use crate::assembler::Assembler;
use crate::callers::{attribute_callers, CallerCounts};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::interner::NameId;
use crate::model::Trace;
use crate::report::CallerReport;
use crate::source::TraceSource;
use std::sync::atomic::AtomicBool;
use tracing::debug;

/// Outcome of a completed analysis run
#[derive(Debug, Clone)]
pub struct CallerAnalysis {
    pub trace: Trace,
    pub target: NameId,
    pub counts: CallerCounts,
}

impl CallerAnalysis {
    pub fn target_name(&self) -> &str {
        self.trace.marker_name(self.target).unwrap_or_default()
    }

    pub fn report(&self) -> CallerReport {
        CallerReport::new(&self.counts, &self.trace.marker_names)
    }

    pub fn print_summary(&self) {
        self.counts
            .print_summary(&self.trace.marker_names, self.target_name());
    }
}

/// Configurable analysis run over one trace source
pub struct Analyzer<'a, S: TraceSource + ?Sized> {
    source: &'a S,
    config: &'a AnalysisConfig,
    progress: Option<Box<dyn FnMut(f32) + 'a>>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, S: TraceSource + ?Sized> Analyzer<'a, S> {
    pub fn new(source: &'a S, config: &'a AnalysisConfig) -> Self {
        Self {
            source,
            config,
            progress: None,
            cancel: None,
        }
    }

    pub fn with_progress(mut self, progress: impl FnMut(f32) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run(self) -> Result<CallerAnalysis> {
        let source_range = self
            .source
            .frame_range()
            .ok_or(AnalysisError::SourceUnavailable)?;
        let range = self.config.resolve_range(source_range);
        if range.is_empty() {
            return Err(AnalysisError::SourceUnavailable);
        }

        let marker = self.config.marker.as_str();
        if self.source.marker_id(marker).is_none() {
            return Err(AnalysisError::TargetNameNotFound(marker.to_string()));
        }

        debug!(first = range.first, last = range.last, marker, "Starting caller analysis");

        let mut assembler = Assembler::new(self.source)
            .log_all_invalid_durations(self.config.log_all_invalid_durations);
        if let Some(progress) = self.progress {
            assembler = assembler.with_progress(progress);
        }
        if let Some(flag) = self.cancel {
            assembler = assembler.with_cancel_flag(flag);
        }
        let trace = assembler.assemble(range)?;

        // Every sample of the marker may have been dropped during assembly
        let target = trace
            .marker_names
            .get(marker)
            .ok_or_else(|| AnalysisError::TargetNameNotFound(marker.to_string()))?;

        let counts = attribute_callers(&trace, target);
        debug!(
            callers = counts.len(),
            occurrences = counts.total(),
            "Caller attribution complete"
        );

        Ok(CallerAnalysis {
            trace,
            target,
            counts,
        })
    }
}

/// Run a caller analysis with default hooks
pub fn analyze<S: TraceSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<CallerAnalysis> {
    Analyzer::new(source, config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CaptureFile, CapturedFrame, CapturedThread};

    fn config_for(marker: &str) -> AnalysisConfig {
        AnalysisConfig {
            marker: marker.to_string(),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_empty_source_unavailable() {
        let source = CaptureFile::default();
        let err = analyze(&source, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable));
    }

    #[test]
    fn test_unknown_marker_not_found() {
        let source = CaptureFile::from_frames(vec![CapturedFrame::new(0, 0.0, 1.0).with_thread(
            CapturedThread::new(1, "Main Thread", "").sample("Update", 1.0, 0),
        )])
        .unwrap();
        let err = analyze(&source, &config_for("GC.Alloc")).unwrap_err();
        assert!(matches!(err, AnalysisError::TargetNameNotFound(ref m) if m == "GC.Alloc"));
    }

    #[test]
    fn test_marker_only_with_negative_durations_not_found() {
        let source = CaptureFile::from_frames(vec![CapturedFrame::new(0, 0.0, 1.0).with_thread(
            CapturedThread::new(1, "Main Thread", "")
                .sample("Update", 1.0, 1)
                .sample("GC.Alloc", -1.0, 0),
        )])
        .unwrap();
        let err = analyze(&source, &config_for("GC.Alloc")).unwrap_err();
        assert!(err.is_silent_abort());
    }

    #[test]
    fn test_analysis_counts_callers() {
        let source = CaptureFile::from_frames(vec![CapturedFrame::new(0, 0.0, 1.0).with_thread(
            CapturedThread::new(1, "Main Thread", "")
                .sample("Update", 1.0, 2)
                .sample("GC.Alloc", 0.1, 0)
                .sample("GC.Alloc", 0.1, 0),
        )])
        .unwrap();

        let analysis = analyze(&source, &config_for("GC.Alloc")).unwrap();
        assert_eq!(analysis.target_name(), "GC.Alloc");
        assert_eq!(analysis.counts.total(), 2);
        assert_eq!(analysis.report().to_csv(), "\"Update\", \"2\"\r\n");
    }

    #[test]
    fn test_default_keeps_every_frame_and_clipping_is_opt_in() {
        let frame = |i| {
            CapturedFrame::new(i, 0.0, 1.0).with_thread(
                CapturedThread::new(1, "Main Thread", "")
                    .sample("Update", 1.0, 1)
                    .sample("GC.Alloc", 0.1, 0),
            )
        };
        let source = CaptureFile::from_frames(vec![frame(0), frame(1), frame(2)]).unwrap();

        let full = analyze(&source, &AnalysisConfig::default()).unwrap();
        assert_eq!(full.trace.frames.len(), 3);
        assert_eq!(full.counts.total(), 3);

        let config = AnalysisConfig {
            clip_trailing_frame: true,
            ..AnalysisConfig::default()
        };
        let clipped = analyze(&source, &config).unwrap();
        assert_eq!(clipped.trace.frames.len(), 2);
        assert_eq!(clipped.counts.total(), 2);
    }
}
