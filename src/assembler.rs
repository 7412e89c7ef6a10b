//! Frame/thread assembly
//!
//! Pulls every thread of every frame in a range from a [`TraceSource`] and
//! builds the [`Trace`] model. Depth is reconstructed inline while the
//! samples stream past, marker names are interned, and recoverable capture
//! problems are logged and counted rather than failing the run.

use crate::depth::DepthReconstructor;
use crate::error::{AnalysisError, Result};
use crate::interner::NameId;
use crate::model::{Frame, Marker, Thread, Trace};
use crate::source::{FrameRange, MarkerId, RawThread, TraceSource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Compose a thread's display name from its raw name and thread group
pub fn composite_thread_name(name: &str, group: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, group)
    }
}

/// Assigns stable, per-frame unique display names to threads
///
/// A thread id keeps the name it was first given for the rest of the run.
/// New threads get a 1-based occurrence suffix counted within the frame.
/// A new thread id with a blank raw name gets no name and is not remembered.
#[derive(Debug, Default)]
pub struct ThreadNamer {
    by_thread_id: HashMap<u64, String>,
    occurrences: HashMap<String, u32>,
    taken: HashSet<String>,
}

impl ThreadNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame occurrence counters
    pub fn begin_frame(&mut self) {
        self.occurrences.clear();
        self.taken.clear();
    }

    /// Display name for `thread_id`, or `None` for an unnamed new thread
    pub fn name_for(&mut self, thread_id: u64, name: &str, group: &str) -> Option<String> {
        if let Some(existing) = self.by_thread_id.get(&thread_id) {
            self.taken.insert(existing.clone());
            return Some(existing.clone());
        }
        if name.trim().is_empty() {
            return None;
        }

        let composite = composite_thread_name(name, group);
        let count = self.occurrences.entry(composite.clone()).or_insert(0);
        let assigned = loop {
            *count += 1;
            let candidate = format!("{} {}", composite, count);
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };

        self.taken.insert(assigned.clone());
        self.by_thread_id.insert(thread_id, assigned.clone());
        Some(assigned)
    }
}

/// Builds a [`Trace`] from a trace source
pub struct Assembler<'a, S: TraceSource + ?Sized> {
    source: &'a S,
    log_all_invalid_durations: bool,
    progress: Option<Box<dyn FnMut(f32) + 'a>>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, S: TraceSource + ?Sized> Assembler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            log_all_invalid_durations: false,
            progress: None,
            cancel: None,
        }
    }

    /// Log every negative-duration sample instead of only the first one in the run
    pub fn log_all_invalid_durations(mut self, enabled: bool) -> Self {
        self.log_all_invalid_durations = enabled;
        self
    }

    /// Receive the fraction of frames processed, from 0.0 to 1.0
    pub fn with_progress(mut self, progress: impl FnMut(f32) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Stop between frames once `flag` is set
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Assemble every captured frame in `range` (inclusive)
    ///
    /// Indices the source does not hold are skipped, so sparse ranges cost
    /// only as much as the frames they contain.
    ///
    /// # Errors
    /// Only [`AnalysisError::Cancelled`]; capture problems are skipped.
    pub fn assemble(mut self, range: FrameRange) -> Result<Trace> {
        let started = Instant::now();
        let mut state = AssemblyState::new(range.first, self.log_all_invalid_durations);
        let total = range.len() as f64;

        let mut cursor = Some(range.first);
        while let Some(from) = cursor.filter(|&from| from <= range.last) {
            let Some(frame_index) = self
                .source
                .next_frame(from)
                .filter(|&index| index >= from && index <= range.last)
            else {
                break;
            };

            if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(AnalysisError::Cancelled {
                    frames_processed: state.trace.frames.len(),
                });
            }

            let offset = frame_index.saturating_sub(range.first);
            self.report_progress((offset as f64 / total) as f32);
            state.assemble_frame(self.source, frame_index, offset);
            cursor = frame_index.checked_add(1);
        }

        self.report_progress(1.0);
        debug!(
            frames = state.trace.frames.len(),
            markers = state.trace.marker_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Assembled trace"
        );
        Ok(state.trace)
    }

    fn report_progress(&mut self, fraction: f32) {
        if let Some(progress) = self.progress.as_mut() {
            progress(fraction);
        }
    }
}

/// Mutable state shared across all frames of one assembly
struct AssemblyState {
    trace: Trace,
    threads: ThreadNamer,
    depths: DepthReconstructor,
    names_by_marker: HashMap<MarkerId, NameId>,
    log_all_invalid_durations: bool,
    invalid_duration_logged: bool,
}

impl AssemblyState {
    fn new(frame_index_offset: i64, log_all_invalid_durations: bool) -> Self {
        Self {
            trace: Trace::new(frame_index_offset),
            threads: ThreadNamer::new(),
            depths: DepthReconstructor::new(),
            names_by_marker: HashMap::new(),
            log_all_invalid_durations,
            invalid_duration_logged: false,
        }
    }

    fn assemble_frame<S: TraceSource + ?Sized>(&mut self, source: &S, frame_index: i64, offset: i64) {
        self.threads.begin_frame();
        let mut frame = Frame {
            index: frame_index,
            ..Frame::default()
        };

        let mut thread_index = 0;
        while let Some(raw) = source.thread(frame_index, thread_index) {
            if thread_index == 0 {
                frame.start_time_ms = raw.frame_start_ms;
                frame.duration_ms = raw.frame_time_ms;
            }
            thread_index += 1;

            let Some(thread_name) = self.threads.name_for(raw.thread_id, raw.name, raw.group) else {
                warn!(
                    "Unnamed thread found on frame {}. Corrupted data suspected, ignoring thread",
                    self.trace.display_frame(offset)
                );
                self.trace.diagnostics.skipped_threads += 1;
                continue;
            };

            let thread = self.assemble_thread(&raw, &thread_name, offset);
            frame.threads.push(thread);
        }

        self.trace.frames.push(frame);
    }

    fn assemble_thread(&mut self, raw: &RawThread<'_>, thread_name: &str, offset: i64) -> Thread {
        let mut thread = Thread::new(self.trace.thread_names.intern(thread_name));

        self.depths.reset();
        // Sample 0 is the thread-name placeholder
        for sample in raw.samples.iter().skip(1) {
            let depth = self.depths.advance(sample.children);

            if sample.duration_ms < 0.0 {
                self.trace.diagnostics.dropped_samples += 1;
                if self.log_all_invalid_durations || !self.invalid_duration_logged {
                    warn!(
                        "Ignoring invalid marker time found for {} on frame {} on thread {} ({} < 0)",
                        sample.name,
                        self.trace.display_frame(offset),
                        raw.name,
                        sample.duration_ms
                    );
                    self.invalid_duration_logged = true;
                }
                continue;
            }

            let name = match self.names_by_marker.get(&sample.marker_id) {
                Some(&name) => name,
                None => {
                    let name = self.trace.marker_names.intern(&sample.name);
                    self.names_by_marker.insert(sample.marker_id, name);
                    name
                }
            };

            thread.markers.push(Marker {
                name,
                duration_ms: sample.duration_ms,
                depth,
            });
        }

        let open = self.depths.reset();
        if open > 0 {
            trace!(thread = %thread_name, open, "Discarding unclosed subtrees at thread end");
            self.trace.diagnostics.unbalanced_threads += 1;
        }

        thread
    }
}
