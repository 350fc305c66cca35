//! Error types for quietcut.

use std::path::PathBuf;

/// Result type alias for quietcut operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for quietcut.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No valid video files found.
    #[error("no valid video files found in the provided paths")]
    NoValidVideoFiles,

    /// Silence detection found nothing worth keeping.
    #[error("no audible content found: the whole media is silent")]
    NoAudibleContent,

    /// The trim plan builder received no segments.
    #[error("cannot build a trim plan from an empty segment list")]
    EmptyInput,

    /// A segment list violates ordering or length invariants.
    #[error("invalid segment at position {index}: {reason}")]
    InvalidSegment {
        /// Position of the offending segment.
        index: usize,
        /// Description of the violation.
        reason: String,
    },

    /// Failed to read a segments file.
    #[error("failed to read segments file '{path}'")]
    SegmentsRead {
        /// Path to the segments file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Segments file content is malformed.
    #[error("invalid segments file format: {message}")]
    InvalidSegmentsFormat {
        /// Description of the format error.
        message: String,
    },

    /// Failed to read a detector log file.
    #[error("failed to read detector log '{path}'")]
    DetectorLogRead {
        /// Path to the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Input video does not exist.
    #[error("input file not found: {path}")]
    InputNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// FFmpeg binary could not be located.
    #[error("ffmpeg not found (install it or set ffmpeg.ffmpeg_path in the config)")]
    FfmpegNotFound,

    /// FFprobe binary could not be located.
    #[error("ffprobe not found (install it or set ffmpeg.ffprobe_path in the config)")]
    FfprobeNotFound,

    /// FFmpeg exited unsuccessfully.
    #[error("ffmpeg failed during {stage}: {message}")]
    FfmpegFailed {
        /// Pipeline stage that ran FFmpeg.
        stage: String,
        /// Last diagnostic line printed by FFmpeg.
        message: String,
        /// Process exit code, if any.
        exit_code: Option<i32>,
    },

    /// FFprobe exited unsuccessfully or printed unusable output.
    #[error("ffprobe failed for '{path}': {message}")]
    FfprobeFailed {
        /// Path to the probed file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The media has no audio stream to analyze.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the media file.
        path: PathBuf,
    },

    /// The media has no video stream to trim.
    #[error("no video stream found in '{path}'")]
    NoVideoStream {
        /// Path to the media file.
        path: PathBuf,
    },

    /// The media reports no usable duration.
    #[error("could not determine duration of '{path}'")]
    UnknownDuration {
        /// Path to the media file.
        path: PathBuf,
    },

    /// An external process ran past its deadline.
    #[error("ffmpeg timed out after {seconds} seconds")]
    Timeout {
        /// Configured timeout.
        seconds: u64,
    },

    /// Processing was cancelled by the user.
    #[error("operation cancelled")]
    Cancelled,

    /// Failed to acquire lock.
    #[error("output is locked by another process: {path}")]
    FileLocked {
        /// Path to the lock file.
        path: PathBuf,
    },

    /// Output exists and overwriting was not requested.
    #[error("output already exists: {path} (use --force to overwrite)")]
    OutputExists {
        /// Existing output path.
        path: PathBuf,
    },

    /// Output would overwrite the source video.
    #[error("output would overwrite its own input: {path}")]
    OutputIsInput {
        /// The shared path.
        path: PathBuf,
    },

    /// Two inputs in one batch map to the same output.
    #[error("'{first}' and '{second}' would both be written to '{output}'")]
    DuplicateOutput {
        /// Input that claimed the output first.
        first: PathBuf,
        /// Input that collides with it.
        second: PathBuf,
        /// Contested output path.
        output: PathBuf,
    },

    /// Moving a finished render into place failed.
    #[error("failed to move rendered output to '{path}'")]
    OutputFinalize {
        /// Final output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create lock file.
    #[error("failed to create lock file '{path}'")]
    LockCreate {
        /// Path to the lock file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a JSON file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Stable `snake_case` identifier used in structured error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::ConfigDirNotFound => "config_dir_not_found",
            Self::ConfigRead { .. } => "config_read_failed",
            Self::ConfigParse { .. } => "config_parse_failed",
            Self::ConfigValidation { .. } => "config_invalid",
            Self::ConfigWrite { .. } => "config_write_failed",
            Self::ConfigSerialize { .. } => "config_serialize_failed",
            Self::NoValidVideoFiles => "no_valid_video_files",
            Self::NoAudibleContent => "no_audible_content",
            Self::EmptyInput => "empty_input",
            Self::InvalidSegment { .. } => "invalid_segment",
            Self::SegmentsRead { .. } => "segments_read_failed",
            Self::InvalidSegmentsFormat { .. } => "invalid_segments_format",
            Self::DetectorLogRead { .. } => "detector_log_read_failed",
            Self::InputNotFound { .. } => "input_not_found",
            Self::FfmpegNotFound => "ffmpeg_not_found",
            Self::FfprobeNotFound => "ffprobe_not_found",
            Self::FfmpegFailed { .. } => "ffmpeg_failed",
            Self::FfprobeFailed { .. } => "ffprobe_failed",
            Self::NoAudioTracks { .. } => "no_audio_tracks",
            Self::NoVideoStream { .. } => "no_video_stream",
            Self::UnknownDuration { .. } => "unknown_duration",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::FileLocked { .. } => "file_locked",
            Self::OutputExists { .. } => "output_exists",
            Self::OutputIsInput { .. } => "output_is_input",
            Self::DuplicateOutput { .. } => "duplicate_output",
            Self::OutputFinalize { .. } => "output_finalize_failed",
            Self::LockCreate { .. } => "lock_create_failed",
            Self::OutputDirCreateFailed { .. } => "output_dir_create_failed",
            Self::JsonWrite { .. } => "json_write_failed",
            Self::Internal { .. } => "internal_error",
        }
    }
}
