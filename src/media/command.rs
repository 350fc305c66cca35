//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::constants::ffmpeg::{FFMPEG_BIN, FFPROBE_BIN, STDERR_TAIL_LINES};
use crate::error::{Error, Result};

/// Builder for FFmpeg command lines.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target (a path, or `-` for the null muxer)
    output: PathBuf,
    /// Arguments placed before `-i`
    input_args: Vec<String>,
    /// Arguments placed after `-i`
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// FFmpeg `-v` level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    #[must_use]
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    #[must_use]
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    #[must_use]
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an audio filter chain.
    #[must_use]
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set an inline filter graph.
    #[must_use]
    pub fn filter_complex(self, graph: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(graph)
    }

    /// Read the filter graph from a file.
    #[must_use]
    pub fn filter_complex_script(self, path: &Path) -> Self {
        self.output_arg("-filter_complex_script")
            .output_arg(path.to_string_lossy())
    }

    /// Map a labelled stream into the output.
    #[must_use]
    pub fn map(self, label: impl AsRef<str>) -> Self {
        self.output_arg("-map")
            .output_arg(format!("[{}]", label.as_ref()))
    }

    /// Set video codec.
    #[must_use]
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    #[must_use]
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    #[must_use]
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set encoder preset.
    #[must_use]
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio bitrate.
    #[must_use]
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Write to the null muxer instead of a file.
    #[must_use]
    pub fn null_output(mut self) -> Self {
        self.output_args.push("-f".to_string());
        self.output_args.push("null".to_string());
        self.output = PathBuf::from("-");
        self
    }

    /// Set log level.
    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output target.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string(), "-nostdin".to_string()];

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Machine-readable progress interleaved with log output
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.to_string_lossy().into_owned());

        args
    }
}

/// Runner for FFmpeg commands with cancellation and timeout.
///
/// Every stderr line is handed to the caller as it arrives. The child is
/// killed when the cancel flag flips to `true` or the deadline passes.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Resolved ffmpeg binary
    binary: PathBuf,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a runner for the given ffmpeg binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    #[must_use]
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Whether cancellation has already been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run a command, passing each stderr line to `on_line`.
    ///
    /// `stage` names the pipeline step in error messages.
    pub async fn run<F>(&self, cmd: &FfmpegCommand, stage: &str, mut on_line: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let args = cmd.build_args();
        debug!(stage, "Running: {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child.stderr.take().ok_or_else(|| Error::Internal {
            message: "ffmpeg stderr was not captured".to_string(),
        })?;
        let mut lines = BufReader::new(stderr).lines();

        let deadline = self
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut cancel_rx = self.cancel_rx.clone();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    on_line(&line);
                    if !is_progress_line(&line) && !line.trim().is_empty() {
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
                () = cancellation(&mut cancel_rx) => {
                    info!(stage, "Cancelled, killing ffmpeg");
                    let _ = child.kill().await;
                    return Err(Error::Cancelled);
                }
                () = expiry(deadline) => {
                    let seconds = self.timeout_secs.unwrap_or_default();
                    warn!(stage, "ffmpeg timed out after {seconds} seconds, killing process");
                    let _ = child.kill().await;
                    return Err(Error::Timeout { seconds });
                }
            }
        }

        let status = child.wait().await?;
        if status.success() {
            return Ok(());
        }

        for line in &tail {
            debug!(stage, "ffmpeg: {line}");
        }
        let message = tail
            .back()
            .cloned()
            .unwrap_or_else(|| format!("exited with {status}"));

        Err(Error::FfmpegFailed {
            stage: stage.to_string(),
            message,
            exit_code: status.code(),
        })
    }
}

/// Resolves when the cancel flag is set. Never resolves without a receiver.
async fn cancellation(rx: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = rx {
        let sender_gone = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if !sender_gone {
            return;
        }
    }
    std::future::pending::<()>().await;
}

/// Resolves at the deadline. Never resolves without one.
async fn expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// `-progress` output is bare `key=value` pairs.
fn is_progress_line(line: &str) -> bool {
    line.split_once('=')
        .is_some_and(|(key, _)| !key.is_empty() && !key.contains(char::is_whitespace))
}

/// Locate ffmpeg, preferring a configured path.
pub fn locate_ffmpeg(configured: Option<&Path>) -> Result<PathBuf> {
    locate(configured, FFMPEG_BIN).ok_or(Error::FfmpegNotFound)
}

/// Locate ffprobe, preferring a configured path.
pub fn locate_ffprobe(configured: Option<&Path>) -> Result<PathBuf> {
    locate(configured, FFPROBE_BIN).ok_or(Error::FfprobeNotFound)
}

fn locate(configured: Option<&Path>, default_name: &str) -> Option<PathBuf> {
    match configured {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        // Bare names such as "ffmpeg7" are looked up on PATH
        Some(path) => which::which(path).ok(),
        None => which::which(default_name).ok(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_order() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .video_codec("libx264")
            .crf(20);
        let args = cmd.build_args();

        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        let codec_pos = args.iter().position(|a| a == "-c:v").unwrap();
        assert!(input_pos < codec_pos);
        assert_eq!(args[input_pos + 1], "in.mp4");
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert!(args.contains(&"-y".to_string()));
        assert!(args.windows(2).any(|w| w == ["-progress", "pipe:2"]));
    }

    #[test]
    fn test_null_output() {
        let cmd = FfmpegCommand::new("in.mp4", "ignored.mp4")
            .audio_filter("silencedetect=noise=-30dB:d=0.5")
            .null_output();
        let args = cmd.build_args();
        assert!(args.ends_with(&["-f".to_string(), "null".to_string(), "-".to_string()]));
        assert_eq!(cmd.output(), Path::new("-"));
    }

    #[test]
    fn test_map_wraps_label() {
        let args = FfmpegCommand::new("a", "b").map("v").build_args();
        assert!(args.windows(2).any(|w| w == ["-map", "[v]"]));
    }

    #[test]
    fn test_log_level() {
        let args = FfmpegCommand::new("a", "b").log_level("info").build_args();
        assert!(args.windows(2).any(|w| w == ["-v", "info"]));
    }

    #[test]
    fn test_is_progress_line() {
        assert!(is_progress_line("out_time_us=5000000"));
        assert!(is_progress_line("progress=continue"));
        assert!(!is_progress_line(
            "[silencedetect @ 0x1] silence_end: 5 | silence_duration: 3"
        ));
        assert!(!is_progress_line("Error opening input file a.mp4."));
        assert!(!is_progress_line("=oops"));
    }

    #[test]
    fn test_locate_missing_configured_path() {
        let result = locate_ffmpeg(Some(Path::new("/nonexistent/bin/ffmpeg-quietcut")));
        assert!(matches!(result, Err(Error::FfmpegNotFound)));
    }

    #[test]
    fn test_runner_cancel_flag() {
        let (tx, rx) = watch::channel(false);
        let runner = FfmpegRunner::new("ffmpeg").with_cancel(rx);
        assert!(!runner.is_cancelled());
        tx.send(true).unwrap();
        assert!(runner.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_returns_cancelled_before_spawn() {
        let (tx, rx) = watch::channel(true);
        let runner = FfmpegRunner::new("/nonexistent/ffmpeg").with_cancel(rx);
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4");
        let result = runner.run(&cmd, "test", |_| {}).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        drop(tx);
    }
}
