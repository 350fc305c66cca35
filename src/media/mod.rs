//! FFmpeg and FFprobe process handling.

mod command;
mod detect;
mod probe;
mod progress;
mod render;

pub use command::{FfmpegCommand, FfmpegRunner, locate_ffmpeg, locate_ffprobe};
pub use detect::{DetectionParams, detect_command, detect_silence};
pub use probe::{MediaInfo, parse_probe_output, probe_media};
pub use progress::{FfmpegProgress, parse_progress_line};
pub use render::{RenderCommand, ensure_distinct, render_command, render_plan};
