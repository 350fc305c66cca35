//! Segment writer trait definition.

use crate::error::Result;
use crate::silence::Interval;

/// Trait for writing audible segment lists.
pub trait SegmentWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single kept segment.
    fn write_segment(&mut self, index: usize, segment: &Interval) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
