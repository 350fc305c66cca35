//! Output format writers and progress reporting.

mod audacity;
mod csv;
mod json;
pub mod json_envelope;
pub mod progress;
pub mod reporter;
mod writer;

pub use audacity::AudacityWriter;
pub use csv::{CSV_HEADER, CsvWriter};
pub use json::{JsonResultWriter, JsonSegmentReport, JsonSettings};
pub use reporter::{
    FileOutcome, JsonProgressReporter, NullReporter, PipelineSummary, ProgressReporter,
    ProgressThrottler, create_reporter, emit_json_result,
};
pub use writer::SegmentWriter;
