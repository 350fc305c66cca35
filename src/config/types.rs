//! Configuration type definitions.

use crate::constants::{detection, output, render};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Silence detection settings.
    pub detection: DetectionConfig,

    /// Output naming and sidecar settings.
    pub output: OutputConfig,

    /// Encoder settings for the trimmed video.
    pub render: RenderConfig,

    /// External tool settings.
    pub ffmpeg: FfmpegConfig,
}

/// Silence detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Noise floor in dB; quieter audio counts as silence.
    pub noise_db: f64,

    /// Minimum silence length in seconds.
    pub min_silence_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            noise_db: detection::DEFAULT_NOISE_DB,
            min_silence_secs: detection::DEFAULT_MIN_SILENCE_SECS,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (None = next to the input).
    pub dir: Option<PathBuf>,

    /// Prefix for trimmed file names.
    pub prefix: String,

    /// Container extension for trimmed files.
    pub container: String,

    /// Segment sidecar files to write alongside each output.
    pub segment_formats: Vec<SegmentFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: output::DEFAULT_PREFIX.to_string(),
            container: output::DEFAULT_CONTAINER.to_string(),
            segment_formats: Vec::new(),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Video encoder name.
    pub video_codec: String,

    /// Audio encoder name.
    pub audio_codec: String,

    /// Encoder preset.
    pub preset: String,

    /// Constant rate factor (0-51).
    pub crf: u8,

    /// Audio bitrate, e.g. `128k`.
    pub audio_bitrate: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            video_codec: render::DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: render::DEFAULT_AUDIO_CODEC.to_string(),
            preset: render::DEFAULT_PRESET.to_string(),
            crf: render::DEFAULT_CRF,
            audio_bitrate: render::DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Explicit ffmpeg binary (default: looked up on `PATH`).
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit ffprobe binary (default: looked up on `PATH`).
    pub ffprobe_path: Option<PathBuf>,

    /// Kill an ffmpeg run after this many seconds.
    pub timeout_secs: Option<u64>,
}

/// Segment sidecar formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentFormat {
    /// CSV segment list, readable by `quietcut render`.
    Csv,
    /// Audacity label track.
    Audacity,
    /// JSON report with totals.
    Json,
}

impl std::fmt::Display for SegmentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Audacity => write!(f, "audacity"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for SegmentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "audacity" | "labels" => Ok(Self::Audacity),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown segments format: {other}")),
        }
    }
}

/// How results and progress are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Log lines and progress bars for people.
    #[default]
    Human,
    /// One JSON array of events, printed at the end.
    Json,
    /// One JSON event per line, streamed.
    Ndjson,
}

impl OutputMode {
    /// Whether stdout carries machine-readable events.
    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Human)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_format_from_str() {
        assert_eq!("csv".parse::<SegmentFormat>().ok(), Some(SegmentFormat::Csv));
        assert_eq!(
            "Audacity".parse::<SegmentFormat>().ok(),
            Some(SegmentFormat::Audacity)
        );
        assert_eq!(
            "labels".parse::<SegmentFormat>().ok(),
            Some(SegmentFormat::Audacity)
        );
        assert_eq!("json".parse::<SegmentFormat>().ok(), Some(SegmentFormat::Json));
        assert!("srt".parse::<SegmentFormat>().is_err());
    }

    #[test]
    fn test_segment_format_display() {
        assert_eq!(SegmentFormat::Csv.to_string(), "csv");
        assert_eq!(SegmentFormat::Audacity.to_string(), "audacity");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.detection.noise_db, -30.0);
        assert_eq!(config.detection.min_silence_secs, 0.5);
        assert_eq!(config.output.prefix, "trimmed-");
        assert_eq!(config.output.container, "mp4");
        assert!(config.output.segment_formats.is_empty());
        assert_eq!(config.render.crf, 20);
        assert!(config.ffmpeg.timeout_secs.is_none());
    }

    #[test]
    fn test_output_mode_structured() {
        assert!(!OutputMode::Human.is_structured());
        assert!(OutputMode::Json.is_structured());
        assert!(OutputMode::Ndjson.is_structured());
    }
}
