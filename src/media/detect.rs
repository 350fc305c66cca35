//! Silence detection pass.

use std::path::Path;

use tracing::debug;

use super::command::{FfmpegCommand, FfmpegRunner};
use super::progress::{FfmpegProgress, parse_progress_line};
use crate::error::Result;
use crate::silence::{SilenceEvent, scan_line};

/// Parameters of FFmpeg's `silencedetect` filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Audio below this level (dB) counts as silence.
    pub noise_db: f64,
    /// Silences shorter than this (seconds) are ignored.
    pub min_silence_secs: f64,
}

impl DetectionParams {
    /// The audio filter expression.
    pub fn filter(&self) -> String {
        format!(
            "silencedetect=noise={}dB:d={}",
            self.noise_db, self.min_silence_secs
        )
    }
}

/// Build the analysis command. Video is not decoded and nothing is written.
pub fn detect_command(input: &Path, params: &DetectionParams) -> FfmpegCommand {
    FfmpegCommand::new(input, "-")
        // silencedetect reports at info level
        .log_level("info")
        .output_arg("-vn")
        .audio_filter(params.filter())
        .null_output()
}

/// Run silence detection and collect events in arrival order.
///
/// `on_progress` receives the analysed percentage of `total_secs`.
pub async fn detect_silence<P>(
    runner: &FfmpegRunner,
    input: &Path,
    params: &DetectionParams,
    total_secs: f64,
    mut on_progress: P,
) -> Result<Vec<SilenceEvent>>
where
    P: FnMut(f64),
{
    let cmd = detect_command(input, params);
    let mut events = Vec::new();
    let mut progress = FfmpegProgress::default();

    runner
        .run(&cmd, "silence detection", |line| {
            for event in scan_line(line) {
                debug!(?event, "silence marker");
                events.push(event);
            }
            if let Some(snapshot) = parse_progress_line(line, &mut progress) {
                on_progress(snapshot.percentage(total_secs));
            }
        })
        .await?;

    Ok(events)
}
