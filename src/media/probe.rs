//! FFprobe media information.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// What the pipeline needs to know about an input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration_secs: f64,
    /// Codec of the first video stream
    pub video_codec: Option<String>,
    /// Codec of the first audio stream
    pub audio_codec: Option<String>,
}

impl MediaInfo {
    /// Whether the file has a video stream.
    pub fn has_video(&self) -> bool {
        self.video_codec.is_some()
    }

    /// Whether the file has an audio stream.
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    /// Fail unless the file has both an audio and a video stream.
    pub fn ensure_trimmable(&self, path: &Path) -> Result<()> {
        if !self.has_audio() {
            return Err(Error::NoAudioTracks {
                path: path.to_path_buf(),
            });
        }
        if !self.has_video() {
            return Err(Error::NoVideoStream {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
}

/// Probe a media file with ffprobe.
pub async fn probe_media(ffprobe: &Path, path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("Probing {}", path.display());

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::FfprobeFailed {
            path: path.to_path_buf(),
            message: stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("ffprobe exited unsuccessfully")
                .to_string(),
        });
    }

    parse_probe_output(path, &output.stdout)
}

/// Interpret ffprobe's JSON report.
///
/// Duration comes from the container, falling back to the longest stream.
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<MediaInfo> {
    let probe: FfprobeOutput =
        serde_json::from_slice(json).map_err(|e| Error::FfprobeFailed {
            path: path.to_path_buf(),
            message: format!("unreadable ffprobe output: {e}"),
        })?;

    let codec_of = |kind: &str| {
        probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
            .map(|s| s.codec_name.clone().unwrap_or_else(|| "unknown".to_string()))
    };

    let container_duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds);
    let stream_duration = probe
        .streams
        .iter()
        .filter_map(|s| s.duration.as_deref().and_then(parse_seconds))
        .reduce(f64::max);

    let duration_secs = container_duration
        .or(stream_duration)
        .ok_or_else(|| Error::UnknownDuration {
            path: PathBuf::from(path),
        })?;

    Ok(MediaInfo {
        duration_secs,
        video_codec: codec_of("video"),
        audio_codec: codec_of("audio"),
    })
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}
