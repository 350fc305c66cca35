//! Silence-event parsing.
//!
//! Turns the boundary events reported by a silence detector into the
//! ordered list of audible regions that survive trimming. Raw detector
//! text is handled by [`log`]; everything in `segments` works on typed
//! [`SilenceEvent`]s only and performs no I/O.

mod event;
pub mod import;
pub mod log;
mod segments;

pub use event::SilenceEvent;
pub use import::parse_segments_file;
pub use log::{events_from_lines, events_from_text, scan_line};
pub use segments::{AudibleSegments, Interval, audible_segments, sweep};
