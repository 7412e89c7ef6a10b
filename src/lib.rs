//! marker-callers - caller attribution for profiler marker captures
//!
//! This library reconstructs call hierarchies from depth-first sample streams
//! that carry only durations and child counts, then counts which callers
//! trigger a named marker (for example `GC.Alloc`) across a whole capture.

pub mod analysis;
pub mod assembler;
pub mod callers;
pub mod cli;
pub mod config;
pub mod depth;
pub mod error;
pub mod hierarchy;
pub mod interner;
pub mod model;
pub mod report;
pub mod source;

pub use analysis::{analyze, Analyzer, CallerAnalysis};
pub use error::{AnalysisError, Result};
