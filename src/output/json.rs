//! JSON segment report writer.

use crate::error::{Error, Result};
use crate::output::SegmentWriter;
use crate::silence::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON segment report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSegmentReport {
    /// Source video file name.
    pub source_file: String,
    /// Analysis timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Detection settings used.
    pub settings: JsonSettings,
    /// Kept segments in playback order.
    pub segments: Vec<JsonSegment>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Detection settings for JSON output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JsonSettings {
    /// Noise floor in dB.
    pub noise_db: f64,
    /// Minimum silence length in seconds.
    pub min_silence_secs: f64,
}

/// Single kept segment in JSON format.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSegment {
    /// Position in the output.
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Segment length in seconds.
    pub duration: f64,
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Number of kept segments.
    pub total_segments: usize,
    /// Source duration in seconds.
    pub source_duration_secs: f64,
    /// Seconds kept in the output.
    pub kept_duration_secs: f64,
    /// Seconds of silence removed.
    pub removed_duration_secs: f64,
}

/// Writer for JSON segment reports.
pub struct JsonResultWriter {
    /// Collected segments.
    segments: Vec<JsonSegment>,
    /// Output file path.
    output_path: PathBuf,
    /// Source file name.
    source_file: String,
    /// Detection settings.
    settings: JsonSettings,
    /// Source duration in seconds.
    source_duration: f64,
}

impl JsonResultWriter {
    /// Create a new JSON result writer.
    ///
    /// # Arguments
    ///
    /// * `output_path` - Path to write the JSON file
    /// * `source_file` - Name of the source video file
    /// * `source_duration` - Probed duration of the source in seconds
    /// * `settings` - Detection settings the segments were produced with
    pub fn new(
        output_path: &Path,
        source_file: &str,
        source_duration: f64,
        settings: JsonSettings,
    ) -> Self {
        Self {
            segments: Vec::new(),
            output_path: output_path.to_path_buf(),
            source_file: source_file.to_string(),
            settings,
            source_duration,
        }
    }

    fn compute_summary(&self) -> JsonSummary {
        let kept: f64 = self.segments.iter().map(|s| s.duration).sum();
        JsonSummary {
            total_segments: self.segments.len(),
            source_duration_secs: self.source_duration,
            kept_duration_secs: kept,
            removed_duration_secs: (self.source_duration - kept).max(0.0),
        }
    }
}

impl SegmentWriter for JsonResultWriter {
    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_segment(&mut self, index: usize, segment: &Interval) -> Result<()> {
        self.segments.push(JsonSegment {
            index,
            start: segment.start,
            end: segment.end,
            duration: segment.duration(),
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let report = JsonSegmentReport {
            source_file: self.source_file.clone(),
            analysis_date: Utc::now(),
            settings: self.settings,
            summary: self.compute_summary(),
            segments: std::mem::take(&mut self.segments),
        };

        let file = File::create(&self.output_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &report).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })?;

        Ok(())
    }
}
