//! FFmpeg `-progress` output parsing.

use serde::Serialize;

/// Snapshot of FFmpeg's progress block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in microseconds
    pub out_time_us: i64,
    /// Encoding speed (1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Output position in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn out_time_secs(&self) -> f64 {
        self.out_time_us.max(0) as f64 / 1_000_000.0
    }

    /// Completion percentage (0-100) against an expected output length.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if self.is_complete {
            return 100.0;
        }
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_secs() / total_secs * 100.0).clamp(0.0, 100.0)
    }
}

/// Fold one `-progress` line into `current`.
///
/// Returns a snapshot when a block ends (`progress=continue|end`).
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        // out_time_ms is microseconds too, despite the name
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_us = us;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.trim().strip_suffix('x').and_then(|s| s.parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            return Some(current.clone());
        }
        _ => {}
    }

    None
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_block_emits_on_progress_key() {
        let mut progress = FfmpegProgress::default();

        assert!(parse_progress_line("frame=120", &mut progress).is_none());
        assert!(parse_progress_line("out_time_us=4000000", &mut progress).is_none());
        assert!(parse_progress_line("speed=2.5x", &mut progress).is_none());

        let snapshot = parse_progress_line("progress=continue", &mut progress);
        let snapshot = snapshot.unwrap_or_default();
        assert_eq!(snapshot.frame, 120);
        assert_eq!(snapshot.out_time_secs(), 4.0);
        assert_eq!(snapshot.speed, 2.5);
        assert!(!snapshot.is_complete);
    }

    #[test]
    fn test_out_time_ms_is_microseconds() {
        let mut progress = FfmpegProgress::default();
        parse_progress_line("out_time_ms=2500000", &mut progress);
        assert_eq!(progress.out_time_secs(), 2.5);
    }

    #[test]
    fn test_na_values_are_ignored() {
        let mut progress = FfmpegProgress::default();
        parse_progress_line("speed=N/A", &mut progress);
        parse_progress_line("out_time_us=N/A", &mut progress);
        assert_eq!(progress.speed, 0.0);
        assert_eq!(progress.out_time_us, 0);
    }

    #[test]
    fn test_percentage() {
        let progress = FfmpegProgress {
            out_time_us: 5_000_000,
            ..Default::default()
        };
        assert!((progress.percentage(10.0) - 50.0).abs() < 1e-9);
        assert_eq!(progress.percentage(2.0), 100.0);
        assert_eq!(progress.percentage(0.0), 0.0);
    }

    #[test]
    fn test_end_is_complete() {
        let mut progress = FfmpegProgress::default();
        let snapshot = parse_progress_line("progress=end", &mut progress);
        assert!(snapshot.is_some_and(|p| p.is_complete && p.percentage(10.0) == 100.0));
    }

    #[test]
    fn test_log_lines_are_ignored() {
        let mut progress = FfmpegProgress::default();
        assert!(parse_progress_line("[silencedetect @ 0x1] silence_start: 2", &mut progress).is_none());
        assert_eq!(progress, FfmpegProgress::default());
    }
}
