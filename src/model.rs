//! In-memory trace model: frames → threads → markers
//!
//! Built once by the [`assembler`](crate::assembler) and read by the caller
//! attribution pass. Markers reference names by [`NameId`] into the trace's
//! marker name table.

use crate::interner::{NameId, NameInterner};

/// One retained sample with its reconstructed depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub name: NameId,
    /// Duration in milliseconds (never negative)
    pub duration_ms: f64,
    /// Nesting level within the thread, root = 1
    pub depth: u32,
}

/// One thread's samples within a frame, in depth-first order
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    /// Id into the trace's thread name table
    pub name: NameId,
    pub markers: Vec<Marker>,
}

impl Thread {
    pub fn new(name: NameId) -> Self {
        Self {
            name,
            markers: Vec::new(),
        }
    }
}

/// One profiling frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Absolute frame index in the source
    pub index: i64,
    pub start_time_ms: f64,
    pub duration_ms: f64,
    pub threads: Vec<Thread>,
}

/// Counters for recoverable capture problems seen during assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyDiagnostics {
    /// Threads skipped because their raw name was empty or whitespace
    pub skipped_threads: usize,
    /// Samples dropped because of a negative duration
    pub dropped_samples: usize,
    /// Threads that ended with ancestor subtrees still open
    pub unbalanced_threads: usize,
}

/// Root container for one analysis run
#[derive(Debug, Clone, Default)]
pub struct Trace {
    /// Captured frames in index order; indices the source does not hold are absent
    pub frames: Vec<Frame>,
    /// Absolute index of the first assembled frame
    pub frame_index_offset: i64,
    pub marker_names: NameInterner,
    pub thread_names: NameInterner,
    pub diagnostics: AssemblyDiagnostics,
}

impl Trace {
    pub fn new(frame_index_offset: i64) -> Self {
        Self {
            frame_index_offset,
            ..Self::default()
        }
    }

    /// One-based display number for a frame `offset` frames after the first
    pub fn display_frame(&self, offset: i64) -> i64 {
        self.frame_index_offset.saturating_add(offset).saturating_add(1)
    }

    pub fn marker_name(&self, id: NameId) -> Option<&str> {
        self.marker_names.resolve(id)
    }

    pub fn thread_name(&self, thread: &Thread) -> Option<&str> {
        self.thread_names.resolve(thread.name)
    }

    /// Total number of retained markers across all frames and threads
    pub fn marker_count(&self) -> usize {
        self.threads().map(|t| t.markers.len()).sum()
    }

    /// All threads of all frames, in frame order
    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.frames.iter().flat_map(|f| f.threads.iter())
    }
}
