//! Trim plan construction.
//!
//! A [`TrimPlan`] describes how to cut every audible interval out of the
//! source and splice the pieces back together in chronological order. It
//! is engine independent; [`filter`] renders it for FFmpeg.

mod builder;
pub mod filter;

pub use builder::{ConcatDirective, SegmentTrim, StreamKind, StreamTag, TrimPlan, build};
pub use filter::filter_graph;
