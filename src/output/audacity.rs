//! Audacity label track writer.
//!
//! Each kept segment becomes a region label (`start<TAB>end<TAB>name`), so
//! the cut can be checked against the source audio in Audacity via
//! *File > Import > Labels* before anything is rendered.

use crate::constants::output::TIME_DECIMAL_PLACES;
use crate::error::Result;
use crate::output::SegmentWriter;
use crate::silence::Interval;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes kept segments as Audacity region labels.
pub struct AudacityWriter<W: Write = BufWriter<File>> {
    out: W,
}

impl AudacityWriter {
    /// Create a label file at `path`, truncating any existing one.
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self::from_writer(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> AudacityWriter<W> {
    /// Write labels to an arbitrary sink.
    pub const fn from_writer(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SegmentWriter for AudacityWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_segment(&mut self, index: usize, segment: &Interval) -> Result<()> {
        let label = index + 1;
        writeln!(
            self.out,
            "{start:.p$}\t{end:.p$}\tSegment {label}",
            start = segment.start,
            end = segment.end,
            p = TIME_DECIMAL_PLACES,
        )?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
