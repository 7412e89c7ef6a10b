//! JSON capture files
//!
//! A capture file stores frames, each with its threads' depth-first sample
//! streams:
//!
//! ```json
//! { "frames": [ { "index": 0, "start_time_ms": 0.0, "frame_time_ms": 16.6,
//!     "threads": [ { "thread_id": 1, "name": "Main Thread", "group": "",
//!       "samples": [ { "name": "Main Thread", "duration_ms": 16.6, "children": 1 },
//!                    { "marker_id": 7, "name": "Update", "duration_ms": 4.0, "children": 0 } ] } ] } ] }
//! ```
//!
//! The first sample of every thread is the thread-name placeholder. Samples
//! without a `marker_id` get one per distinct name when the file is loaded.

use super::{FrameRange, MarkerId, RawSample, RawThread, TraceSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Serialized form of [`RawSample`] with an optional marker id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_id: Option<MarkerId>,
    pub name: String,
    pub duration_ms: f64,
    #[serde(default)]
    pub children: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedThread {
    pub thread_id: u64,
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub samples: Vec<CapturedSample>,
}

impl CapturedThread {
    /// New thread whose sample stream starts with the thread-name placeholder
    pub fn new(thread_id: u64, name: impl Into<String>, group: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            thread_id,
            samples: vec![CapturedSample {
                marker_id: None,
                name: name.clone(),
                duration_ms: 0.0,
                children: 0,
            }],
            name,
            group: group.into(),
        }
    }

    /// Append a sample in depth-first order
    pub fn sample(mut self, name: impl Into<String>, duration_ms: f64, children: u32) -> Self {
        self.samples.push(CapturedSample {
            marker_id: None,
            name: name.into(),
            duration_ms,
            children,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub index: i64,
    #[serde(default)]
    pub start_time_ms: f64,
    #[serde(default)]
    pub frame_time_ms: f64,
    #[serde(default)]
    pub threads: Vec<CapturedThread>,
}

impl CapturedFrame {
    pub fn new(index: i64, start_time_ms: f64, frame_time_ms: f64) -> Self {
        Self {
            index,
            start_time_ms,
            frame_time_ms,
            threads: Vec::new(),
        }
    }

    pub fn with_thread(mut self, thread: CapturedThread) -> Self {
        self.threads.push(thread);
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CaptureDocument {
    #[serde(default)]
    frames: Vec<CapturedFrame>,
}

/// One thread with its samples resolved to marker ids
#[derive(Debug, Clone)]
struct IndexedThread {
    thread_id: u64,
    name: String,
    group: String,
    samples: Vec<RawSample>,
}

#[derive(Debug, Clone)]
struct IndexedFrame {
    start_time_ms: f64,
    frame_time_ms: f64,
    threads: Vec<IndexedThread>,
}

/// A loaded capture, usable as a [`TraceSource`]
#[derive(Debug, Clone, Default)]
pub struct CaptureFile {
    frames: BTreeMap<i64, IndexedFrame>,
    marker_ids: HashMap<String, MarkerId>,
}

impl CaptureFile {
    /// Load a capture from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read capture file: {}", path.as_ref().display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid capture file: {}", path.as_ref().display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: CaptureDocument =
            serde_json::from_str(content).context("Failed to parse capture JSON")?;
        Self::from_frames(document.frames)
    }

    /// Index frames by frame index and resolve marker ids
    ///
    /// # Errors
    /// Returns error if two frames share an index, or if a new marker id
    /// would exceed the id space above the largest explicit id.
    pub fn from_frames(frames: Vec<CapturedFrame>) -> Result<Self> {
        // Explicit ids first, so unnamed samples can share them by name
        let mut marker_ids: HashMap<String, MarkerId> = HashMap::new();
        let mut max_explicit: Option<MarkerId> = None;
        for sample in frames
            .iter()
            .flat_map(|f| f.threads.iter())
            .flat_map(|t| t.samples.iter())
        {
            if let Some(id) = sample.marker_id {
                marker_ids.entry(sample.name.clone()).or_insert(id);
                max_explicit = Some(max_explicit.map_or(id, |max| max.max(id)));
            }
        }

        // `None` once the id space is used up
        let mut next_id: Option<MarkerId> = match max_explicit {
            Some(max) => max.checked_add(1).map(|id| id.max(0)),
            None => Some(0),
        };

        let mut indexed = BTreeMap::new();
        for frame in frames {
            let mut threads = Vec::with_capacity(frame.threads.len());
            for thread in frame.threads {
                let mut samples = Vec::with_capacity(thread.samples.len());
                for sample in thread.samples {
                    let known = sample
                        .marker_id
                        .or_else(|| marker_ids.get(&sample.name).copied());
                    let marker_id = match known {
                        Some(id) => id,
                        None => {
                            let Some(id) = next_id else {
                                anyhow::bail!(
                                    "No marker id left for '{}' (explicit ids reach {})",
                                    sample.name,
                                    MarkerId::MAX
                                );
                            };
                            next_id = id.checked_add(1);
                            marker_ids.insert(sample.name.clone(), id);
                            id
                        }
                    };
                    samples.push(RawSample {
                        marker_id,
                        name: sample.name,
                        duration_ms: sample.duration_ms,
                        children: sample.children,
                    });
                }
                threads.push(IndexedThread {
                    thread_id: thread.thread_id,
                    name: thread.name,
                    group: thread.group,
                    samples,
                });
            }

            let previous = indexed.insert(
                frame.index,
                IndexedFrame {
                    start_time_ms: frame.start_time_ms,
                    frame_time_ms: frame.frame_time_ms,
                    threads,
                },
            );
            if previous.is_some() {
                anyhow::bail!("Duplicate frame index {} in capture", frame.index);
            }
        }

        Ok(Self {
            frames: indexed,
            marker_ids,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Serialize back to the on-disk JSON form
    pub fn to_json_string(&self) -> Result<String> {
        let frames = self
            .frames
            .iter()
            .map(|(&index, frame)| CapturedFrame {
                index,
                start_time_ms: frame.start_time_ms,
                frame_time_ms: frame.frame_time_ms,
                threads: frame
                    .threads
                    .iter()
                    .map(|t| CapturedThread {
                        thread_id: t.thread_id,
                        name: t.name.clone(),
                        group: t.group.clone(),
                        samples: t
                            .samples
                            .iter()
                            .map(|s| CapturedSample {
                                marker_id: Some(s.marker_id),
                                name: s.name.clone(),
                                duration_ms: s.duration_ms,
                                children: s.children,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        serde_json::to_string_pretty(&CaptureDocument { frames })
            .context("Failed to serialize capture")
    }
}

impl TraceSource for CaptureFile {
    fn frame_range(&self) -> Option<FrameRange> {
        let first = *self.frames.keys().next()?;
        let last = *self.frames.keys().next_back()?;
        Some(FrameRange::new(first, last))
    }

    fn next_frame(&self, from: i64) -> Option<i64> {
        self.frames.range(from..).next().map(|(&index, _)| index)
    }

    fn thread(&self, frame_index: i64, thread_index: usize) -> Option<RawThread<'_>> {
        let frame = self.frames.get(&frame_index)?;
        let thread = frame.threads.get(thread_index)?;
        Some(RawThread {
            thread_id: thread.thread_id,
            name: &thread.name,
            group: &thread.group,
            frame_start_ms: frame.start_time_ms,
            frame_time_ms: frame.frame_time_ms,
            samples: &thread.samples,
        })
    }

    fn marker_id(&self, name: &str) -> Option<MarkerId> {
        self.marker_ids.get(name).copied()
    }
}
