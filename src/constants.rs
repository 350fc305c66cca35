//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "quietcut";

/// Lock file extension.
pub const LOCK_FILE_EXTENSION: &str = ".quietcut.lock";

/// Silence detection defaults and bounds.
pub mod detection {
    /// Default noise floor in dB; audio quieter than this counts as silence.
    pub const DEFAULT_NOISE_DB: f64 = -30.0;

    /// Lowest accepted noise floor in dB.
    pub const MIN_NOISE_DB: f64 = -100.0;

    /// Highest accepted noise floor in dB.
    pub const MAX_NOISE_DB: f64 = 0.0;

    /// Default minimum silence length in seconds.
    pub const DEFAULT_MIN_SILENCE_SECS: f64 = 0.5;

    /// Shortest accepted minimum silence length in seconds.
    pub const MIN_SILENCE_SECS: f64 = 0.01;

    /// Longest accepted minimum silence length in seconds.
    pub const MAX_SILENCE_SECS: f64 = 60.0;

    /// Marker FFmpeg prints when a silent region begins.
    pub const SILENCE_START_MARKER: &str = "silence_start:";

    /// Marker FFmpeg prints when a silent region ends.
    pub const SILENCE_END_MARKER: &str = "silence_end:";
}

/// Output naming defaults.
pub mod output {
    /// Prefix prepended to trimmed output file names.
    pub const DEFAULT_PREFIX: &str = "trimmed-";

    /// Default output container extension.
    pub const DEFAULT_CONTAINER: &str = "mp4";

    /// Decimal places for timestamps written to sidecar files.
    pub const TIME_DECIMAL_PLACES: usize = 3;
}

/// Segment sidecar file extensions by format.
pub mod segment_extensions {
    /// CSV segment list extension.
    pub const CSV: &str = ".segments.csv";
    /// Audacity label track extension.
    pub const AUDACITY: &str = ".segments.txt";
    /// JSON segment report extension.
    pub const JSON: &str = ".segments.json";
}

/// Render defaults passed to FFmpeg.
pub mod render {
    /// Default video encoder.
    pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
    /// Default audio encoder.
    pub const DEFAULT_AUDIO_CODEC: &str = "aac";
    /// Default x264 preset.
    pub const DEFAULT_PRESET: &str = "veryfast";
    /// Default constant rate factor.
    pub const DEFAULT_CRF: u8 = 20;
    /// Highest CRF accepted by x264.
    pub const MAX_CRF: u8 = 51;
    /// Default audio bitrate.
    pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

    /// Filter graphs longer than this are passed through a script file
    /// instead of the command line.
    pub const MAX_INLINE_FILTER_LEN: usize = 32 * 1024;

    /// Name of the combined video stream produced by the concat filter.
    pub const VIDEO_OUTPUT_LABEL: &str = "v";
    /// Name of the combined audio stream produced by the concat filter.
    pub const AUDIO_OUTPUT_LABEL: &str = "a";
}

/// FFmpeg process handling.
pub mod ffmpeg {
    /// FFmpeg binary name looked up on `PATH`.
    pub const FFMPEG_BIN: &str = "ffmpeg";
    /// FFprobe binary name looked up on `PATH`.
    pub const FFPROBE_BIN: &str = "ffprobe";
    /// Number of trailing stderr lines kept for error messages.
    pub const STDERR_TAIL_LINES: usize = 8;
}

/// Supported input video extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v", "flv", "ts"];
