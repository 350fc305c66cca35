//! quietcut - trim silence out of videos.
//!
//! This crate turns FFmpeg `silencedetect` output into the list of audible
//! segments of a recording, builds a trim plan from them and renders the
//! trimmed video with FFmpeg.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod locking;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod silence;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, TrimArgs};
use config::{
    Config, OutputMode, config_file_path, load_config_file, load_default_config,
    save_default_config, validate_config,
};
use indicatif::MultiProgress;
use media::{FfmpegRunner, ensure_distinct, locate_ffmpeg, locate_ffprobe};
use output::json_envelope::{
    BatchProgress, CancelReason, ConfigPathPayload, ConfigPayload, ErrorSeverity, FileStatus,
    RenderPayload, ResultType, TrimPlanPayload,
};
use output::{FileOutcome, NullReporter, PipelineSummary, create_reporter, emit_json_result};
use pipeline::{
    JobContext, ProcessCheck, Toolchain, assign_outputs, collect_input_files, output_dir_for,
    output_path_for, process_file, render_segments, should_process,
};
use silence::{audible_segments, events_from_text, parse_segments_file};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub use error::{Error, Result};

/// Main entry point for the quietcut CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.trim.verbose, cli.trim.quiet);

    // First Ctrl+C stops FFmpeg and lets the job clean up; a second one exits.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    install_interrupt_handler(cancel_tx);

    let output_mode = cli.trim.output_mode;

    if let Some(Command::Config { action }) = cli.command {
        return handle_config_command(action, output_mode);
    }

    let config = resolve_config(load_default_config()?, &cli.trim);
    validate_config(&config)?;

    match cli.command {
        Some(Command::Plan { log, duration }) => handle_plan(&log, duration, output_mode),
        Some(Command::Render {
            video,
            segments,
            output,
            force,
        }) => handle_render(
            &video,
            &segments,
            output,
            force,
            &cli.trim,
            &config,
            cancel_rx,
        ),
        Some(Command::Config { .. }) => Ok(()),
        None => {
            if cli.inputs.is_empty() {
                let ffmpeg_available = locate_ffmpeg(config.ffmpeg.ffmpeg_path.as_deref()).is_ok();
                cli::help::print_smart_help(ffmpeg_available);
                return Ok(());
            }
            trim_files(&cli.inputs, &cli.trim, &config, cancel_rx)
        }
    }
}

/// Apply command-line (and environment) overrides on top of the file config.
pub fn resolve_config(mut config: Config, args: &TrimArgs) -> Config {
    if let Some(noise_db) = args.noise_db {
        config.detection.noise_db = noise_db;
    }
    if let Some(min_silence) = args.min_silence {
        config.detection.min_silence_secs = min_silence;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = Some(dir.clone());
    }
    if let Some(formats) = &args.segments_format {
        config.output.segment_formats.clone_from(formats);
    }
    if let Some(timeout) = args.timeout {
        config.ffmpeg.timeout_secs = Some(timeout);
    }
    config
}

/// Trim every video found under `inputs`.
fn trim_files(
    inputs: &[PathBuf],
    args: &TrimArgs,
    config: &Config,
    cancel_rx: watch::Receiver<bool>,
) -> Result<()> {
    use crate::output::progress;

    let total_start = Instant::now();

    let files = collect_input_files(inputs, &config.output.prefix)?;
    if files.is_empty() {
        return Err(Error::NoValidVideoFiles);
    }

    let jobs = assign_outputs(&files, &config.output)?;

    info!("Found {} video file(s) to process", files.len());
    info!(
        "Silence threshold {}dB, minimum length {}s",
        config.detection.noise_db, config.detection.min_silence_secs
    );

    let tools = toolchain(config, cancel_rx)?;
    let runtime = create_runtime()?;

    let reporter = create_reporter(args.output_mode);
    let progress_enabled = !args.quiet && !args.no_progress && !args.output_mode.is_structured();
    let multi_progress = MultiProgress::new();
    let file_progress = progress::create_file_progress(files.len(), progress_enabled)
        .map(|pb| multi_progress.add(pb));

    let ctx = JobContext {
        config,
        dry_run: args.dry_run,
        reporter: reporter.as_ref(),
        multi_progress: &multi_progress,
        progress_enabled,
    };

    reporter.pipeline_started(
        files.len(),
        config.detection.noise_db,
        config.detection.min_silence_secs,
        args.dry_run,
    );

    let mut summary = PipelineSummary::default();
    let total = files.len();

    for (index, (file, output)) in jobs.iter().enumerate() {
        if tools.runner.is_cancelled() {
            reporter.cancelled(CancelReason::UserInterrupt, summary.files_processed, total);
            progress::finish_progress(file_progress, "Cancelled");
            return Err(Error::Cancelled);
        }

        // Dry runs write no video, so an existing one is no reason to skip
        match should_process(output, args.force || args.dry_run) {
            ProcessCheck::SkipExists => {
                info!("Skipping (output exists): {}", file.display());
                summary.files_skipped += 1;
                reporter.file_skipped(file, FileStatus::Skipped);
                progress::inc_progress(file_progress.as_ref());
                continue;
            }
            ProcessCheck::SkipLocked => {
                info!("Skipping (locked): {}", file.display());
                summary.files_skipped += 1;
                reporter.file_skipped(file, FileStatus::Locked);
                progress::inc_progress(file_progress.as_ref());
                continue;
            }
            ProcessCheck::Process => {}
        }

        reporter.file_started(file, index);
        reporter.progress(Some(&batch_progress(index, total)), None);

        match runtime.block_on(process_file(file, output, &tools, &ctx)) {
            Ok(result) => {
                summary.files_processed += 1;
                summary.total_input_secs += result.input_duration_secs;
                summary.total_removed_secs += result.removed_secs;
                reporter.file_completed_success(
                    file,
                    &FileOutcome {
                        output: result.output.as_deref(),
                        segments: result.segments,
                        removed_secs: result.removed_secs,
                        duration_ms: millis(Duration::from_secs_f64(result.duration_secs)),
                    },
                );
            }
            Err(Error::Cancelled) => {
                warn!("Cancelled while processing {}", file.display());
                reporter.cancelled(CancelReason::UserInterrupt, summary.files_processed, total);
                progress::finish_progress(file_progress, "Cancelled");
                return Err(Error::Cancelled);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                summary.files_failed += 1;
                reporter.file_completed_failure(file, e.code(), &e.to_string());
                if args.fail_fast {
                    reporter.error(e.code(), ErrorSeverity::Fatal, &e.to_string(), None);
                    progress::finish_progress(file_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(file_progress.as_ref());
    }

    progress::finish_progress(file_progress, "Complete");

    summary.duration_ms = millis(total_start.elapsed());
    reporter.pipeline_completed(&summary);

    info!(
        "Complete: {} processed, {} skipped, {} errors, {} of silence removed in {:.2}s",
        summary.files_processed,
        summary.files_skipped,
        summary.files_failed,
        progress::format_duration(summary.total_removed_secs),
        total_start.elapsed().as_secs_f64()
    );

    if summary.files_failed > 0 {
        warn!("{} file(s) had errors", summary.files_failed);
    }

    Ok(())
}

/// Parse a saved detector log and print the segments and filter graph.
fn handle_plan(log: &Path, duration: f64, output_mode: OutputMode) -> Result<()> {
    let text = std::fs::read_to_string(log).map_err(|e| Error::DetectorLogRead {
        path: log.to_path_buf(),
        source: e,
    })?;
    let events = events_from_text(&text);
    debug!(events = events.len(), "parsed detector log");

    let segments = audible_segments(events, duration)?;
    let plan = plan::build(segments.as_slice())?;
    let graph = plan::filter_graph(&plan);

    if output_mode.is_structured() {
        emit_json_result(&TrimPlanPayload {
            result_type: ResultType::TrimPlan,
            log: log.to_path_buf(),
            total_duration_secs: duration,
            segments: segments.as_slice().to_vec(),
            plan,
            filter_graph: graph,
        });
        return Ok(());
    }

    println!("Audible segments ({}):", segments.len());
    for (index, segment) in segments.iter().enumerate() {
        println!(
            "  {index:>3}  {:>10.3}  {:>10.3}  ({:.3}s)",
            segment.start,
            segment.end,
            segment.duration()
        );
    }
    println!();
    println!(
        "Kept {:.3}s of {:.3}s ({:.3}s removed)",
        segments.kept_duration(),
        duration,
        (duration - segments.kept_duration()).max(0.0)
    );
    println!();
    println!("Filter graph:");
    println!("{graph}");

    Ok(())
}

/// Render a video from an edited segments CSV.
fn handle_render(
    video: &Path,
    segments_path: &Path,
    output: Option<PathBuf>,
    force: bool,
    args: &TrimArgs,
    config: &Config,
    cancel_rx: watch::Receiver<bool>,
) -> Result<()> {
    let segments = parse_segments_file(segments_path)?;
    info!(
        "Loaded {} segment(s) from {}",
        segments.len(),
        segments_path.display()
    );

    let output = output.unwrap_or_else(|| {
        let dir = output_dir_for(video, config.output.dir.as_deref());
        output_path_for(video, &dir, &config.output)
    });
    ensure_distinct(video, &output)?;

    match should_process(&output, force) {
        ProcessCheck::SkipExists => return Err(Error::OutputExists { path: output }),
        ProcessCheck::SkipLocked => {
            return Err(Error::FileLocked {
                path: locking::FileLock::lock_path_for(&output),
            });
        }
        ProcessCheck::Process => {}
    }

    let tools = toolchain(config, cancel_rx)?;
    let runtime = create_runtime()?;
    let multi_progress = MultiProgress::new();
    let ctx = JobContext {
        config,
        dry_run: false,
        reporter: &NullReporter,
        multi_progress: &multi_progress,
        progress_enabled: !args.quiet && !args.no_progress && !args.output_mode.is_structured(),
    };

    let result = runtime.block_on(render_segments(video, &output, &segments, &tools, &ctx))?;

    if args.output_mode.is_structured() {
        emit_json_result(&RenderPayload {
            result_type: ResultType::Render,
            input: video.to_path_buf(),
            output: output.clone(),
            segments: result.segments,
            output_duration_secs: segments.kept_duration(),
            duration_ms: millis(Duration::from_secs_f64(result.duration_secs)),
        });
    } else {
        println!(
            "Wrote {} ({} segment(s), {:.1}s removed)",
            output.display(),
            result.segments,
            result.removed_secs
        );
    }

    Ok(())
}

fn handle_config_command(action: ConfigAction, output_mode: OutputMode) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                if output_mode.is_structured() {
                    emit_json_result(&ConfigPathPayload {
                        result_type: ResultType::ConfigPath,
                        config_path: path,
                        exists: true,
                    });
                } else {
                    println!("Configuration file already exists: {}", path.display());
                }
            } else {
                let saved_path = save_default_config(&Config::default())?;
                if output_mode.is_structured() {
                    emit_json_result(&ConfigPathPayload {
                        result_type: ResultType::ConfigPath,
                        config_path: saved_path,
                        exists: true,
                    });
                } else {
                    println!("Created configuration file: {}", saved_path.display());
                    println!("\nNext steps:");
                    println!("  Edit [detection] noise_db / min_silence_secs to tune trimming");
                }
            }
            Ok(())
        }
        ConfigAction::Show => {
            let path = config_file_path()?;
            let config = load_config_file(&path)?;
            if output_mode.is_structured() {
                let value = serde_json::to_value(&config).map_err(|e| Error::Internal {
                    message: format!("failed to serialize config: {e}"),
                })?;
                emit_json_result(&ConfigPayload {
                    result_type: ResultType::Config,
                    config_path: path,
                    config: value,
                });
            } else {
                let contents = toml::to_string_pretty(&config)
                    .map_err(|e| Error::ConfigSerialize { source: e })?;
                println!("# {}", path.display());
                print!("{contents}");
            }
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            if output_mode.is_structured() {
                let exists = path.exists();
                emit_json_result(&ConfigPathPayload {
                    result_type: ResultType::ConfigPath,
                    config_path: path,
                    exists,
                });
            } else {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn toolchain(config: &Config, cancel_rx: watch::Receiver<bool>) -> Result<Toolchain> {
    let ffmpeg = locate_ffmpeg(config.ffmpeg.ffmpeg_path.as_deref())?;
    let ffprobe = locate_ffprobe(config.ffmpeg.ffprobe_path.as_deref())?;
    debug!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "using FFmpeg binaries");

    Ok(Toolchain {
        runner: FfmpegRunner::new(ffmpeg)
            .with_cancel(cancel_rx)
            .with_timeout(config.ffmpeg.timeout_secs),
        ffprobe,
    })
}

fn create_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| Error::Internal {
        message: format!("Failed to create async runtime: {e}"),
    })
}

fn install_interrupt_handler(cancel_tx: watch::Sender<bool>) {
    let interrupted = AtomicBool::new(false);
    if let Err(e) = ctrlc::set_handler(move || {
        if interrupted.swap(true, Ordering::SeqCst) {
            locking::cleanup_all_locks();
            std::process::exit(130); // 128 + SIGINT(2)
        }
        eprintln!("Interrupted, stopping FFmpeg (press Ctrl+C again to force quit)");
        let _ = cancel_tx.send(true);
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
}

#[allow(clippy::cast_precision_loss)]
fn batch_progress(index: usize, total: usize) -> BatchProgress {
    BatchProgress {
        current: index + 1,
        total,
        percent: (index as f32 / total.max(1) as f32) * 100.0,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // stderr keeps stdout free for JSON output
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::SegmentFormat;

    fn parse_args(args: &[&str]) -> TrimArgs {
        Cli::try_parse_from(args).unwrap().trim
    }

    #[test]
    fn test_resolve_config_prefers_cli_values() {
        let mut file_config = Config::default();
        file_config.detection.noise_db = -50.0;
        file_config.output.segment_formats = vec![SegmentFormat::Json];

        let args = parse_args(&[
            "quietcut",
            "a.mp4",
            "--noise=-20",
            "--segments-format",
            "csv",
            "--timeout",
            "30",
        ]);
        let config = resolve_config(file_config, &args);

        assert_eq!(config.detection.noise_db, -20.0);
        assert_eq!(config.output.segment_formats, vec![SegmentFormat::Csv]);
        assert_eq!(config.ffmpeg.timeout_secs, Some(30));
    }

    #[test]
    fn test_resolve_config_keeps_file_values() {
        let mut file_config = Config::default();
        file_config.detection.min_silence_secs = 1.25;

        let config = resolve_config(file_config.clone(), &parse_args(&["quietcut", "a.mp4"]));
        assert_eq!(config, file_config);
    }

    #[test]
    fn test_batch_progress() {
        let progress = batch_progress(1, 4);
        assert_eq!(progress.current, 2);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percent, 25.0);
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
