//! Progress bar utilities for file processing.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for processing multiple files.
pub fn create_file_progress(total_files: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_files == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_files as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Create a percentage bar for one FFmpeg pass over a file.
pub fn create_stage_progress(stage: &str, file_name: &str, enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>3}}% {stage} - {file_name}"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Set a percentage bar to `percent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn set_percent(pb: Option<&ProgressBar>, percent: f64) {
    if let Some(pb) = pb {
        pb.set_position(percent.clamp(0.0, 100.0) as u64);
    }
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}

/// Finishes and detaches a per-stage bar when dropped, on success or error.
pub struct ProgressGuard {
    bar: Option<ProgressBar>,
    multi: Option<MultiProgress>,
    message: &'static str,
}

impl ProgressGuard {
    /// Wrap `bar`, removing it from `multi` once done.
    pub fn new(
        bar: Option<ProgressBar>,
        multi: Option<MultiProgress>,
        message: &'static str,
    ) -> Self {
        Self {
            bar,
            multi,
            message,
        }
    }

    /// The guarded bar, if progress is enabled.
    pub fn get(&self) -> Option<&ProgressBar> {
        self.bar.as_ref()
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(self.message);
            if let Some(multi) = &self.multi {
                multi.remove(&bar);
            }
        }
    }
}

/// Format seconds as `H:MM:SS` or `M:SS`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
