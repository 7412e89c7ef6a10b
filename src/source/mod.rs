//! Trace source abstraction
//!
//! A trace source hands out per-frame, per-thread sample streams in
//! depth-first order. Each sample carries only a duration and a direct
//! children count; depth is reconstructed by the assembler.

mod capture;

pub use capture::{CaptureFile, CapturedFrame, CapturedSample, CapturedThread};

use serde::{Deserialize, Serialize};

/// Source-specific marker identifier
pub type MarkerId = i32;

/// One raw sample as reported by a trace source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub marker_id: MarkerId,
    pub name: String,
    pub duration_ms: f64,
    pub children: u32,
}

/// One thread's capture within a frame
///
/// The first sample is the thread-name placeholder and carries no marker.
#[derive(Debug, Clone, Copy)]
pub struct RawThread<'a> {
    pub thread_id: u64,
    pub name: &'a str,
    pub group: &'a str,
    pub frame_start_ms: f64,
    pub frame_time_ms: f64,
    pub samples: &'a [RawSample],
}

/// Inclusive range of frame indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub first: i64,
    pub last: i64,
}

impl FrameRange {
    pub fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Drop one trailing frame when the range holds more than one
    ///
    /// Some capture front-ends expose a last frame that is still being
    /// written; this is the convention for skipping it.
    pub fn clip_trailing(self) -> Self {
        if self.first < self.last {
            Self {
                first: self.first,
                last: self.last - 1,
            }
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        let span = i128::from(self.last) - i128::from(self.first) + 1;
        usize::try_from(span.max(0)).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<i64> {
        self.first..=self.last
    }
}

/// Provider of captured frames
pub trait TraceSource {
    /// First and last capturable frame indices, or `None` when nothing is available
    fn frame_range(&self) -> Option<FrameRange>;

    /// Smallest captured frame index at or after `from`
    ///
    /// Dense sources can keep the default; sparse ones return the next index
    /// they actually hold so gaps are skipped without probing each index.
    fn next_frame(&self, from: i64) -> Option<i64> {
        Some(from)
    }

    /// Thread `thread_index` of frame `frame_index`; `None` ends the frame's thread list
    fn thread(&self, frame_index: i64, thread_index: usize) -> Option<RawThread<'_>>;

    /// Resolve a marker name to the source's marker id
    fn marker_id(&self, name: &str) -> Option<MarkerId>;
}

impl<T: TraceSource + ?Sized> TraceSource for &T {
    fn frame_range(&self) -> Option<FrameRange> {
        (**self).frame_range()
    }

    fn next_frame(&self, from: i64) -> Option<i64> {
        (**self).next_frame(from)
    }

    fn thread(&self, frame_index: i64, thread_index: usize) -> Option<RawThread<'_>> {
        (**self).thread(frame_index, thread_index)
    }

    fn marker_id(&self, name: &str) -> Option<MarkerId> {
        (**self).marker_id(name)
    }
}
