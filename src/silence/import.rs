//! Segments file parsing.
//!
//! Reads the CSV segment lists written by `--segments-format csv` (possibly
//! hand-edited) back into validated [`AudibleSegments`]. Uses the `csv`
//! crate for quoting and BOM handling.

use std::path::Path;

use serde::Deserialize;

use super::{AudibleSegments, Interval};
use crate::error::{Error, Result};

/// Internal record for CSV deserialization. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct SegmentRecord {
    #[serde(rename = "Start (s)")]
    start: f64,
    #[serde(rename = "End (s)")]
    end: f64,
}

/// Parse a segments CSV file.
///
/// Requires `Start (s)` and `End (s)` columns. Rows must describe ordered,
/// non-overlapping intervals.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - Required columns are missing or values cannot be parsed
/// - The intervals violate ordering or length rules
/// - The file contains no rows
pub fn parse_segments_file(path: &Path) -> Result<AudibleSegments> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::SegmentsRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut intervals = Vec::new();

    for (line_num, result) in reader.deserialize::<SegmentRecord>().enumerate() {
        let record = result.map_err(|e| Error::InvalidSegmentsFormat {
            message: format!("line {}: {e}", line_num + 2),
        })?;
        intervals.push(Interval::new(record.start, record.end));
    }

    if intervals.is_empty() {
        return Err(Error::InvalidSegmentsFormat {
            message: format!("{} contains no segments", path.display()),
        });
    }

    AudibleSegments::from_intervals(intervals)
}
