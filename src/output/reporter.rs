//! Pipeline event reporting.
//!
//! Machine-readable modes serialize every event as a [`JsonEnvelope`];
//! human mode drops them and relies on progress bars.

use crate::config::OutputMode;
use crate::output::json_envelope::{
    BatchProgress, CancelReason, CancelledPayload, ErrorPayload, ErrorSeverity, EventType,
    FileCompletedPayload, FileErrorInfo, FileProgress, FileStartedPayload, FileStatus,
    JsonEnvelope, PipelineCompletedPayload, PipelineStartedPayload, PipelineStatus,
    ProgressPayload, SegmentsPayload, Stage, StagePayload,
};
use crate::silence::AudibleSegments;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Receiver for pipeline lifecycle events.
///
/// Every method defaults to a no-op so sinks only handle what they render.
#[allow(unused_variables)]
pub trait ProgressReporter: Send + Sync {
    /// Batch is about to start.
    fn pipeline_started(&self, total_files: usize, noise_db: f64, min_silence_secs: f64, dry_run: bool) {}

    /// A file is about to be processed.
    fn file_started(&self, file: &Path, index: usize) {}

    /// A processing stage began.
    fn stage(&self, file: &Path, stage: Stage, message: &str) {}

    /// Batch and/or per-file progress moved.
    fn progress(&self, batch: Option<&BatchProgress>, file: Option<&FileProgress>) {}

    /// Audible segments were found in a file.
    fn segments(&self, file: &Path, segments: &AudibleSegments, total_duration_secs: f64) {}

    /// A file was trimmed, or planned in a dry run.
    fn file_completed_success(&self, file: &Path, outcome: &FileOutcome<'_>) {}

    /// A file failed with the given error code.
    fn file_completed_failure(&self, file: &Path, error_code: &str, error_message: &str) {}

    /// A file was not processed.
    fn file_skipped(&self, file: &Path, reason: FileStatus) {}

    /// Batch finished. Buffering sinks write everything out here.
    fn pipeline_completed(&self, summary: &PipelineSummary) {}

    /// Something went wrong outside a single file.
    fn error(&self, code: &str, severity: ErrorSeverity, message: &str, suggestion: Option<&str>) {}

    /// The batch was interrupted.
    fn cancelled(&self, reason: CancelReason, files_completed: usize, files_total: usize) {}
}

/// What a successfully processed file produced.
#[derive(Debug, Clone, Copy)]
pub struct FileOutcome<'a> {
    /// Rendered output, absent in dry runs.
    pub output: Option<&'a Path>,
    /// Number of audible segments kept.
    pub segments: usize,
    /// Seconds of silence removed.
    pub removed_secs: f64,
    /// Wall-clock processing time in milliseconds.
    pub duration_ms: u64,
}

/// Summary of pipeline execution.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Files successfully processed.
    pub files_processed: usize,
    /// Files that failed.
    pub files_failed: usize,
    /// Files skipped.
    pub files_skipped: usize,
    /// Seconds of source media across processed files.
    pub total_input_secs: f64,
    /// Seconds of silence removed across processed files.
    pub total_removed_secs: f64,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineSummary {
    /// Overall outcome of the batch.
    pub const fn status(&self) -> PipelineStatus {
        match (self.files_failed, self.files_processed) {
            (0, _) => PipelineStatus::Success,
            (_, 0) => PipelineStatus::Failed,
            _ => PipelineStatus::PartialSuccess,
        }
    }
}

/// Limits how often per-file progress events are emitted.
///
/// An update passes when it moved at least `min_step` percent or
/// `min_interval` has elapsed since the last one. 0% and 100% always pass.
pub struct ProgressThrottler {
    state: Mutex<ThrottleState>,
    min_step: u8,
    min_interval: Duration,
}

struct ThrottleState {
    last_percent: u8,
    last_emit: Instant,
}

impl ProgressThrottler {
    /// Throttler passing every 10% or every 500ms.
    pub fn new() -> Self {
        Self::with_limits(10, Duration::from_millis(500))
    }

    /// Throttler with custom limits.
    pub fn with_limits(min_step: u8, min_interval: Duration) -> Self {
        Self {
            state: Mutex::new(ThrottleState {
                last_percent: 0,
                last_emit: Instant::now(),
            }),
            min_step,
            min_interval,
        }
    }

    /// Whether an update at `percent` should be emitted.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn should_emit(&self, percent: f32) -> bool {
        // floor so 100 is only reported once the stage is really done
        let current = percent.floor().clamp(0.0, 100.0) as u8;
        let Ok(mut state) = self.state.lock() else {
            return true;
        };

        let pass = current == 0
            || current == 100
            || current.saturating_sub(state.last_percent) >= self.min_step
            || state.last_emit.elapsed() >= self.min_interval;

        if pass {
            state.last_percent = current;
            state.last_emit = Instant::now();
        }
        pass
    }

    /// Start over for a new stage.
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.last_percent = 0;
            state.last_emit = Instant::now();
        }
    }
}

impl Default for ProgressThrottler {
    fn default() -> Self {
        Self::new()
    }
}

/// Where serialized events go.
enum Sink {
    /// NDJSON: one line per event, written immediately.
    Lines(Box<dyn Write + Send>),
    /// JSON: events held back and written as one array on flush.
    Array {
        writer: Box<dyn Write + Send>,
        events: Vec<String>,
    },
}

/// JSON/NDJSON progress reporter implementation.
pub struct JsonProgressReporter {
    throttler: ProgressThrottler,
    sink: Mutex<Sink>,
    write_failed: AtomicBool,
}

impl JsonProgressReporter {
    /// Create a reporter writing to stdout.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_writer(mode, io::stdout())
    }

    /// Create a reporter with a custom writer.
    ///
    /// `OutputMode::Json` buffers into an array; every other mode streams lines.
    pub fn with_writer<W: Write + Send + 'static>(mode: OutputMode, writer: W) -> Self {
        let writer: Box<dyn Write + Send> = Box::new(writer);
        let sink = if mode == OutputMode::Json {
            Sink::Array {
                writer,
                events: Vec::new(),
            }
        } else {
            Sink::Lines(writer)
        };
        Self {
            throttler: ProgressThrottler::new(),
            sink: Mutex::new(sink),
            write_failed: AtomicBool::new(false),
        }
    }

    fn emit<T: serde::Serialize>(&self, event: EventType, payload: T) {
        let Ok(json) = serde_json::to_string(&JsonEnvelope::new(event, payload)) else {
            return;
        };
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };

        match &mut *sink {
            Sink::Lines(writer) => {
                let result = writeln!(writer, "{json}").and_then(|()| writer.flush());
                if let Err(e) = result
                    && !self.write_failed.swap(true, Ordering::Relaxed)
                {
                    // broken pipes would repeat this on every event
                    eprintln!(
                        "quietcut: warning: failed to write to stdout: {e} (subsequent errors suppressed)"
                    );
                }
            }
            Sink::Array { events, .. } => events.push(json),
        }
    }

    /// Write out buffered events as a JSON array. No-op when streaming.
    pub fn flush(&self) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        if let Sink::Array { writer, events } = &mut *sink {
            let body = events
                .iter()
                .map(|json| format!("  {json}"))
                .collect::<Vec<_>>()
                .join(",\n");
            let _ = writeln!(writer, "[\n{body}\n]");
            let _ = writer.flush();
            events.clear();
        }
    }
}

impl ProgressReporter for JsonProgressReporter {
    fn pipeline_started(&self, total_files: usize, noise_db: f64, min_silence_secs: f64, dry_run: bool) {
        self.emit(
            EventType::PipelineStarted,
            PipelineStartedPayload {
                total_files,
                noise_db,
                min_silence_secs,
                dry_run,
            },
        );
    }

    fn file_started(&self, file: &Path, index: usize) {
        self.emit(
            EventType::FileStarted,
            FileStartedPayload {
                file: file.to_path_buf(),
                index,
            },
        );
    }

    fn stage(&self, file: &Path, stage: Stage, message: &str) {
        self.throttler.reset();
        self.emit(
            EventType::Stage,
            StagePayload {
                file: file.to_path_buf(),
                stage,
                message: message.to_string(),
            },
        );
    }

    fn progress(&self, batch: Option<&BatchProgress>, file: Option<&FileProgress>) {
        let should_emit = file.is_none_or(|f| self.throttler.should_emit(f.percent));

        if should_emit {
            self.emit(
                EventType::Progress,
                ProgressPayload {
                    batch: batch.cloned(),
                    file: file.cloned(),
                },
            );
        }
    }

    fn segments(&self, file: &Path, segments: &AudibleSegments, total_duration_secs: f64) {
        self.emit(
            EventType::Segments,
            SegmentsPayload {
                file: file.to_path_buf(),
                total_duration_secs,
                kept_duration_secs: segments.kept_duration(),
                segments: segments.as_slice().to_vec(),
            },
        );
    }

    fn file_completed_success(&self, file: &Path, outcome: &FileOutcome<'_>) {
        self.emit(
            EventType::FileCompleted,
            FileCompletedPayload {
                output: outcome.output.map(Path::to_path_buf),
                segments: Some(outcome.segments),
                removed_secs: Some(outcome.removed_secs),
                duration_ms: Some(outcome.duration_ms),
                ..FileCompletedPayload::bare(file, FileStatus::Processed)
            },
        );
    }

    fn file_completed_failure(&self, file: &Path, error_code: &str, error_message: &str) {
        self.emit(
            EventType::FileCompleted,
            FileCompletedPayload {
                error: Some(FileErrorInfo {
                    code: error_code.to_string(),
                    message: error_message.to_string(),
                }),
                ..FileCompletedPayload::bare(file, FileStatus::Failed)
            },
        );
    }

    fn file_skipped(&self, file: &Path, reason: FileStatus) {
        self.emit(
            EventType::FileCompleted,
            FileCompletedPayload::bare(file, reason),
        );
    }

    fn pipeline_completed(&self, summary: &PipelineSummary) {
        self.emit(
            EventType::PipelineCompleted,
            PipelineCompletedPayload {
                status: summary.status(),
                files_processed: summary.files_processed,
                files_failed: summary.files_failed,
                files_skipped: summary.files_skipped,
                total_input_secs: summary.total_input_secs,
                total_removed_secs: summary.total_removed_secs,
                duration_ms: summary.duration_ms,
            },
        );

        self.flush();
    }

    fn error(&self, code: &str, severity: ErrorSeverity, message: &str, suggestion: Option<&str>) {
        self.emit(
            EventType::Error,
            ErrorPayload {
                code: code.to_string(),
                severity,
                message: message.to_string(),
                suggestion: suggestion.map(ToString::to_string),
            },
        );
        if severity == ErrorSeverity::Fatal {
            self.flush();
        }
    }

    fn cancelled(&self, reason: CancelReason, files_completed: usize, files_total: usize) {
        self.emit(
            EventType::Cancelled,
            CancelledPayload {
                reason,
                files_completed,
                files_total,
            },
        );

        self.flush();
    }
}

/// Reporter that drops every event.
///
/// Human mode draws `indicatif` bars from the pipeline instead.
pub struct NullReporter;

impl ProgressReporter for NullReporter {}

/// Create a reporter based on output mode.
pub fn create_reporter(mode: OutputMode) -> Box<dyn ProgressReporter> {
    match mode {
        OutputMode::Human => Box::new(NullReporter),
        OutputMode::Json | OutputMode::Ndjson => Box::new(JsonProgressReporter::new(mode)),
    }
}

/// Emit a JSON result event to stdout.
///
/// Used by one-shot command handlers in JSON or NDJSON output mode.
pub fn emit_json_result<T: serde::Serialize>(payload: &T) {
    let envelope = JsonEnvelope::new(EventType::Result, payload);
    match serde_json::to_string(&envelope) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            // stderr so the JSON stream stays parseable
            eprintln!("error: failed to serialize JSON result: {e}");
        }
    }
}
