//! Wire types for `json` and `ndjson` output.
//!
//! Every event printed in `json` / `ndjson` mode is wrapped in the same
//! envelope so that a frontend can drive its UI from quietcut's stdout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::silence::Interval;

/// Version of the event schema; bumped on breaking payload changes.
pub const SPEC_VERSION: &str = "1.0";

/// Common wrapper around every event written to stdout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct JsonEnvelope<T> {
    /// Event schema version.
    pub spec_version: String,
    /// When the event was produced (UTC).
    pub timestamp: DateTime<Utc>,
    /// Discriminator for `payload`.
    pub event: EventType,
    /// Event body.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Wrap `payload`, stamped with the current time.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }
}

/// Kinds of events on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Trimming pipeline starting.
    PipelineStarted,
    /// A file is up next.
    FileStarted,
    /// A processing stage began.
    Stage,
    /// Throttled progress tick.
    Progress,
    /// Audible segments found in a file.
    Segments,
    /// A file finished, failed or was skipped.
    FileCompleted,
    /// Batch done; last event of a normal run.
    PipelineCompleted,
    /// Final result of a one-shot command.
    Result,
    /// Something went wrong.
    Error,
    /// Run interrupted.
    Cancelled,
}

/// Which command produced a `result` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Trim plan computed from a detector log.
    TrimPlan,
    /// Render from an edited segment list.
    Render,
    /// `config show`.
    Config,
    /// Configuration file location.
    ConfigPath,
}

/// How bad an `error` event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// The run stops.
    Fatal,
    /// The run carries on.
    Warning,
}

/// Processing stages of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading duration and streams.
    Probing,
    /// Running silence detection.
    Detecting,
    /// Building the trim plan.
    Planning,
    /// Encoding the trimmed output.
    Rendering,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Probing => write!(f, "probing"),
            Self::Detecting => write!(f, "detecting silence"),
            Self::Planning => write!(f, "planning"),
            Self::Rendering => write!(f, "rendering"),
        }
    }
}

/// Position within the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// 1-based index of the file being worked on.
    pub current: usize,
    /// Files in the batch.
    pub total: usize,
    /// 0 to 100.
    pub percent: f32,
}

/// Position within the current stage of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProgress {
    /// Source video.
    pub path: PathBuf,
    /// Stage the percentage refers to.
    pub stage: Stage,
    /// 0 to 100.
    pub percent: f32,
}

/// Body of an `error` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable `snake_case` code, see [`crate::error::Error::code`].
    pub code: String,
    /// Whether the run stops.
    pub severity: ErrorSeverity,
    /// Display text of the error.
    pub message: String,
    /// Hint for fixing it, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Outcome of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File was trimmed (or planned, in a dry run).
    Processed,
    /// An error ended processing.
    Failed,
    /// Output already there and `--force` not given.
    Skipped,
    /// Another run holds the output lock.
    Locked,
}

/// Body of `pipeline_started`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStartedPayload {
    /// Videos queued.
    pub total_files: usize,
    /// Noise floor in dB.
    pub noise_db: f64,
    /// Minimum silence length in seconds.
    pub min_silence_secs: f64,
    /// Whether rendering is skipped.
    pub dry_run: bool,
}

/// Body of `file_started`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStartedPayload {
    /// Source video.
    pub file: PathBuf,
    /// 0-based position in the batch.
    pub index: usize,
}

/// Payload for `stage` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagePayload {
    /// Source video.
    pub file: PathBuf,
    /// Stage that began.
    pub stage: Stage,
    /// Log-style description.
    pub message: String,
}

/// Body of `progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Batch position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchProgress>,
    /// Stage position of the current file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileProgress>,
}

/// Payload for `segments` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsPayload {
    /// Source video.
    pub file: PathBuf,
    /// Source duration in seconds.
    pub total_duration_secs: f64,
    /// Audible time kept, in seconds.
    pub kept_duration_secs: f64,
    /// Audible intervals in output order.
    pub segments: Vec<Interval>,
}

/// Body of `file_completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCompletedPayload {
    /// Source video.
    pub file: PathBuf,
    /// Outcome.
    pub status: FileStatus,
    /// Trimmed output (absent in dry runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Number of audible segments kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<usize>,
    /// Seconds of silence removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_secs: Option<f64>,
    /// Wall-clock time spent on the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Set when `status` is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileErrorInfo>,
}

impl FileCompletedPayload {
    /// Payload carrying only the file and its status.
    pub fn bare(file: &std::path::Path, status: FileStatus) -> Self {
        Self {
            file: file.to_path_buf(),
            status,
            output: None,
            segments: None,
            removed_secs: None,
            duration_ms: None,
            error: None,
        }
    }
}

/// Why a file failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileErrorInfo {
    /// Stable error code.
    pub code: String,
    /// Display text.
    pub message: String,
}

/// Body of `pipeline_completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCompletedPayload {
    /// Batch outcome.
    pub status: PipelineStatus,
    /// Files trimmed or planned.
    pub files_processed: usize,
    /// Files that errored.
    pub files_failed: usize,
    /// Files skipped as existing or locked.
    pub files_skipped: usize,
    /// Seconds of source media across processed files.
    pub total_input_secs: f64,
    /// Seconds of silence removed across processed files.
    pub total_removed_secs: f64,
    /// Wall-clock time for the whole batch.
    pub duration_ms: u64,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Nothing failed.
    Success,
    /// Some files failed, some were processed.
    PartialSuccess,
    /// Every attempted file failed.
    Failed,
}

/// Body of `cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledPayload {
    /// What stopped the run.
    pub reason: CancelReason,
    /// Files finished before the interrupt.
    pub files_completed: usize,
    /// Files that were queued.
    pub files_total: usize,
}

/// What interrupted a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Ctrl+C.
    UserInterrupt,
    /// An FFmpeg run exceeded its time limit.
    Timeout,
}

/// Payload for the `plan` command result.
#[derive(Debug, Clone, Serialize)]
pub struct TrimPlanPayload {
    /// Always the matching [`ResultType`].
    pub result_type: ResultType,
    /// Detector log that was parsed.
    pub log: PathBuf,
    /// Source duration in seconds.
    pub total_duration_secs: f64,
    /// Audible intervals.
    pub segments: Vec<Interval>,
    /// The plan itself.
    pub plan: crate::plan::TrimPlan,
    /// Rendered FFmpeg filter graph.
    pub filter_graph: String,
}

/// Payload for the `render` command result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPayload {
    /// Always the matching [`ResultType`].
    pub result_type: ResultType,
    /// Source video.
    pub input: PathBuf,
    /// Trimmed output.
    pub output: PathBuf,
    /// Number of segments rendered.
    pub segments: usize,
    /// Output duration in seconds.
    pub output_duration_secs: f64,
    /// Processing duration in milliseconds.
    pub duration_ms: u64,
}

/// Result of `config show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPayload {
    /// Always the matching [`ResultType`].
    pub result_type: ResultType,
    /// Location of `config.toml`.
    pub config_path: PathBuf,
    /// Effective configuration.
    pub config: serde_json::Value,
}

/// Payload for config path result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPathPayload {
    /// Always the matching [`ResultType`].
    pub result_type: ResultType,
    /// Location of `config.toml`.
    pub config_path: PathBuf,
    /// Whether the file exists.
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_envelope_round_trip() {
        let envelope = JsonEnvelope::new(
            EventType::Cancelled,
            CancelledPayload {
                reason: CancelReason::UserInterrupt,
                files_completed: 1,
                files_total: 4,
            },
        );
        let json = serde_json::to_string(&envelope).expect("serialize");
        let back: JsonEnvelope<CancelledPayload> = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.event, EventType::Cancelled);
        assert_eq!(back.payload.reason, CancelReason::UserInterrupt);
        assert_eq!(back.spec_version, SPEC_VERSION);
    }

    #[test]
    fn test_pipeline_started_envelope() {
        let payload = PipelineStartedPayload {
            total_files: 3,
            noise_db: -30.0,
            min_silence_secs: 0.5,
            dry_run: false,
        };
        let envelope = JsonEnvelope::new(EventType::PipelineStarted, payload);

        let json = serde_json::to_string(&envelope).expect("serialize");
        assert!(json.contains("\"spec_version\":\"1.0\""));
        assert!(json.contains("\"event\":\"pipeline_started\""));
        assert!(json.contains("\"total_files\":3"));
        assert!(json.contains("\"noise_db\":-30.0"));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(
            serde_json::to_string(&EventType::FileCompleted).expect("serialize"),
            "\"file_completed\""
        );
        assert_eq!(
            serde_json::to_string(&EventType::Segments).expect("serialize"),
            "\"segments\""
        );
    }

    #[test]
    fn test_result_names() {
        assert_eq!(
            serde_json::to_string(&ResultType::TrimPlan).expect("serialize"),
            "\"trim_plan\""
        );
        assert_eq!(
            serde_json::to_string(&ResultType::ConfigPath).expect("serialize"),
            "\"config_path\""
        );
    }

    #[test]
    fn test_segments_payload() {
        let payload = SegmentsPayload {
            file: PathBuf::from("talk.mp4"),
            total_duration_secs: 10.0,
            kept_duration_secs: 7.0,
            segments: vec![Interval::new(0.0, 2.0), Interval::new(5.0, 10.0)],
        };
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("{\"start\":5.0,\"end\":10.0}"));
    }

    #[test]
    fn test_file_completed_skips_none() {
        let payload = FileCompletedPayload::bare(Path::new("talk.mp4"), FileStatus::Locked);
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("\"status\":\"locked\""));
        assert!(!json.contains("\"output\""));
        assert!(!json.contains("\"error\""));
    }
}
