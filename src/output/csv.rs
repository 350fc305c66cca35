//! CSV segment list writer.
//!
//! The layout is what `quietcut render --segments` reads back, so a list
//! can be hand-edited between a dry run and the final render.

use crate::constants::output::TIME_DECIMAL_PLACES;
use crate::error::Result;
use crate::output::SegmentWriter;
use crate::silence::Interval;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of segment CSV files.
pub const CSV_HEADER: &str = "Index,Start (s),End (s),Duration (s)";

/// CSV format segment writer.
pub struct CsvWriter {
    writer: BufWriter<File>,
}

impl CsvWriter {
    /// Create a new CSV writer.
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl SegmentWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        writeln!(self.writer, "{CSV_HEADER}")?;
        Ok(())
    }

    fn write_segment(&mut self, index: usize, segment: &Interval) -> Result<()> {
        writeln!(
            self.writer,
            "{index},{:.decimal$},{:.decimal$},{:.decimal$}",
            segment.start,
            segment.end,
            segment.duration(),
            decimal = TIME_DECIMAL_PLACES,
        )?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
