//! Single file processing pipeline.

use crate::config::{Config, SegmentFormat};
use crate::error::{Error, Result};
use crate::locking::FileLock;
use crate::media::{
    DetectionParams, FfmpegRunner, MediaInfo, detect_silence, ensure_distinct, probe_media,
    render_plan,
};
use crate::output::json_envelope::{FileProgress, Stage};
use crate::output::progress::{self, ProgressGuard};
use crate::output::{
    AudacityWriter, CsvWriter, JsonResultWriter, JsonSettings, ProgressReporter, SegmentWriter,
};
use crate::pipeline::sidecar_path_for;
use crate::plan::{TrimPlan, build, filter_graph};
use crate::silence::{AudibleSegments, audible_segments};
use indicatif::MultiProgress;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// External tools a job runs.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Runner for `ffmpeg` invocations.
    pub runner: FfmpegRunner,
    /// Resolved `ffprobe` binary.
    pub ffprobe: PathBuf,
}

/// Per-run switches shared by every job.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    /// Effective configuration.
    pub config: &'a Config,
    /// Detect and plan only; nothing is rendered.
    pub dry_run: bool,
    /// Structured event sink.
    pub reporter: &'a dyn ProgressReporter,
    /// Bar container for human mode.
    pub multi_progress: &'a MultiProgress,
    /// Whether to draw indicatif bars.
    pub progress_enabled: bool,
}

/// Result of processing a single file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Rendered file, `None` for dry runs.
    pub output: Option<PathBuf>,
    /// Number of audible segments kept.
    pub segments: usize,
    /// Source duration in seconds.
    pub input_duration_secs: f64,
    /// Seconds of silence removed.
    pub removed_secs: f64,
    /// Processing duration in seconds.
    pub duration_secs: f64,
}

/// Trim the silence out of `input`, writing the result to `output`.
///
/// Probes the source, runs silence detection, turns the detector events into
/// audible segments and a trim plan, writes any configured segment sidecars
/// and renders. The output is locked for the whole job. The render goes to a
/// hidden sibling that only replaces `output` once FFmpeg succeeds, so a
/// failed or cancelled run leaves any earlier output untouched.
pub async fn process_file(
    input: &Path,
    output: &Path,
    tools: &Toolchain,
    ctx: &JobContext<'_>,
) -> Result<ProcessResult> {
    let start_time = Instant::now();
    info!("Processing: {}", input.display());

    ensure_distinct(input, output)?;
    ensure_parent_dir(output)?;
    let _lock = FileLock::acquire(input, output)?;

    let media = probe(input, tools, ctx).await?;

    ctx.reporter
        .stage(input, Stage::Detecting, "detecting silent regions");
    let params = DetectionParams {
        noise_db: ctx.config.detection.noise_db,
        min_silence_secs: ctx.config.detection.min_silence_secs,
    };
    let events = {
        let guard = stage_bar(ctx, "detect", input);
        detect_silence(
            &tools.runner,
            input,
            &params,
            media.duration_secs,
            |percent| report_percent(ctx, &guard, input, Stage::Detecting, percent),
        )
        .await?
    };
    debug!(events = events.len(), "silence detection finished");

    let segments = audible_segments(events, media.duration_secs)?;
    ctx.reporter.segments(input, &segments, media.duration_secs);
    info!(
        "Keeping {} segment(s), {} of {}",
        segments.len(),
        progress::format_duration(segments.kept_duration()),
        progress::format_duration(media.duration_secs)
    );

    ctx.reporter.stage(input, Stage::Planning, "building trim plan");
    let plan = build(segments.as_slice())?;
    debug!(graph_len = filter_graph(&plan).len(), "trim plan built");

    write_sidecars(input, output, &segments, media.duration_secs, ctx.config)?;

    let removed_secs = (media.duration_secs - segments.kept_duration()).max(0.0);

    let rendered = if ctx.dry_run {
        info!("Dry run: skipping render of {}", output.display());
        None
    } else {
        render_with_cleanup(input, output, &plan, tools, ctx).await?;
        Some(output.to_path_buf())
    };

    let duration_secs = start_time.elapsed().as_secs_f64();
    let speed = if duration_secs > 0.0 {
        media.duration_secs / duration_secs
    } else {
        0.0
    };
    info!(
        "Removed {:.1}s of silence in {:.2}s ({:.1}x realtime)",
        removed_secs, duration_secs, speed
    );

    Ok(ProcessResult {
        output: rendered,
        segments: plan.segment_count(),
        input_duration_secs: media.duration_secs,
        removed_secs,
        duration_secs,
    })
}

/// Render `input` from an externally supplied segment list, skipping detection.
pub async fn render_segments(
    input: &Path,
    output: &Path,
    segments: &AudibleSegments,
    tools: &Toolchain,
    ctx: &JobContext<'_>,
) -> Result<ProcessResult> {
    let start_time = Instant::now();

    ensure_distinct(input, output)?;
    ensure_parent_dir(output)?;
    let _lock = FileLock::acquire(input, output)?;

    let media = probe(input, tools, ctx).await?;
    if let Some(last) = segments.as_slice().last()
        && last.end > media.duration_secs
    {
        warn!(
            "Segment list ends at {:.3}s but {} is only {:.3}s long",
            last.end,
            input.display(),
            media.duration_secs
        );
    }

    let plan = build(segments.as_slice())?;
    render_with_cleanup(input, output, &plan, tools, ctx).await?;

    Ok(ProcessResult {
        output: Some(output.to_path_buf()),
        segments: plan.segment_count(),
        input_duration_secs: media.duration_secs,
        removed_secs: (media.duration_secs - plan.output_duration()).max(0.0),
        duration_secs: start_time.elapsed().as_secs_f64(),
    })
}

async fn probe(input: &Path, tools: &Toolchain, ctx: &JobContext<'_>) -> Result<MediaInfo> {
    ctx.reporter
        .stage(input, Stage::Probing, "reading media information");
    let media = probe_media(&tools.ffprobe, input).await?;
    media.ensure_trimmable(input)?;
    info!(
        "Source is {} ({:.1}s)",
        progress::format_duration(media.duration_secs),
        media.duration_secs
    );
    Ok(media)
}

async fn render_with_cleanup(
    input: &Path,
    output: &Path,
    plan: &TrimPlan,
    tools: &Toolchain,
    ctx: &JobContext<'_>,
) -> Result<()> {
    ensure_distinct(input, output)?;
    ctx.reporter.stage(
        input,
        Stage::Rendering,
        &format!("rendering {} segment(s)", plan.segment_count()),
    );

    let staging = partial_path_for(output);
    let partial = PartialOutput::new(&staging);
    {
        let guard = stage_bar(ctx, "render", input);
        render_plan(
            &tools.runner,
            input,
            &staging,
            plan,
            &ctx.config.render,
            |percent| report_percent(ctx, &guard, input, Stage::Rendering, percent),
        )
        .await?;
    }

    fs::rename(&staging, output).map_err(|source| Error::OutputFinalize {
        path: output.to_path_buf(),
        source,
    })?;
    partial.keep();

    info!("Wrote {}", output.display());
    Ok(())
}

/// Hidden sibling a render is written to before it replaces `output`.
///
/// Keeps the extension so FFmpeg still picks the right muxer.
fn partial_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    let name = match output.extension() {
        Some(ext) => format!(".{stem}.partial.{}", ext.to_string_lossy()),
        None => format!(".{stem}.partial"),
    };
    output.with_file_name(name)
}

fn stage_bar(ctx: &JobContext<'_>, stage: &str, input: &Path) -> ProgressGuard {
    let file_name = input
        .file_name()
        .map_or_else(|| "unknown".into(), |n| n.to_string_lossy());
    let bar = progress::create_stage_progress(stage, &file_name, ctx.progress_enabled)
        .map(|pb| ctx.multi_progress.add(pb));
    let multi = bar.as_ref().map(|_| ctx.multi_progress.clone());
    ProgressGuard::new(bar, multi, "done")
}

#[allow(clippy::cast_possible_truncation)]
fn report_percent(
    ctx: &JobContext<'_>,
    guard: &ProgressGuard,
    input: &Path,
    stage: Stage,
    percent: f64,
) {
    progress::set_percent(guard.get(), percent);
    ctx.reporter.progress(
        None,
        Some(&FileProgress {
            path: input.to_path_buf(),
            stage,
            percent: percent as f32,
        }),
    );
}

fn ensure_parent_dir(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Write the configured segment sidecars next to `output`.
fn write_sidecars(
    input: &Path,
    output: &Path,
    segments: &AudibleSegments,
    source_duration: f64,
    config: &Config,
) -> Result<()> {
    for format in &config.output.segment_formats {
        let path = sidecar_path_for(output, *format);
        debug!("Writing {} segments: {}", format, path.display());

        let mut writer: Box<dyn SegmentWriter> = match format {
            SegmentFormat::Csv => Box::new(CsvWriter::new(&path)?),
            SegmentFormat::Audacity => Box::new(AudacityWriter::new(&path)?),
            SegmentFormat::Json => {
                let source = input
                    .file_name()
                    .map_or_else(|| "unknown".into(), |n| n.to_string_lossy());
                Box::new(JsonResultWriter::new(
                    &path,
                    &source,
                    source_duration,
                    JsonSettings {
                        noise_db: config.detection.noise_db,
                        min_silence_secs: config.detection.min_silence_secs,
                    },
                ))
            }
        };

        writer.write_header()?;
        for (index, segment) in segments.iter().enumerate() {
            writer.write_segment(index, segment)?;
        }
        writer.finalize()?;
    }

    Ok(())
}

/// Removes a staging file on drop unless the render completed.
struct PartialOutput<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> PartialOutput<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            match fs::remove_file(self.path) {
                Ok(()) => debug!("Removed partial output {}", self.path.display()),
                Err(e) => warn!(
                    "Failed to remove partial output {}: {e}",
                    self.path.display()
                ),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::silence::Interval;
    use std::fs::File;
    use tempfile::TempDir;

    fn sample_segments() -> AudibleSegments {
        AudibleSegments::from_intervals(vec![Interval::new(0.0, 2.0), Interval::new(5.0, 10.0)])
            .unwrap()
    }

    #[test]
    fn test_partial_output_removed_unless_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trimmed-a.mp4");

        File::create(&path).unwrap();
        drop(PartialOutput::new(&path));
        assert!(!path.exists());

        File::create(&path).unwrap();
        PartialOutput::new(&path).keep();
        assert!(path.exists());
    }

    fn job_context<'a>(
        config: &'a Config,
        multi: &'a MultiProgress,
    ) -> JobContext<'a> {
        JobContext {
            config,
            dry_run: false,
            reporter: &crate::output::NullReporter,
            multi_progress: multi,
            progress_enabled: false,
        }
    }

    fn missing_tools(dir: &Path) -> Toolchain {
        Toolchain {
            runner: FfmpegRunner::new(dir.join("no-such-ffmpeg")),
            ffprobe: dir.join("no-such-ffprobe"),
        }
    }

    #[tokio::test]
    async fn test_in_place_render_keeps_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("talk.mp4");
        fs::write(&source, b"original video").unwrap();

        let config = Config::default();
        let multi = MultiProgress::new();
        let ctx = job_context(&config, &multi);
        let tools = missing_tools(dir.path());
        let plan = build(sample_segments().as_slice()).unwrap();

        let result = render_with_cleanup(&source, &source, &plan, &tools, &ctx).await;
        assert!(matches!(result, Err(Error::OutputIsInput { .. })));
        assert_eq!(fs::read(&source).unwrap(), b"original video");

        let respelled = dir.path().join(".").join("talk.mp4");
        let result = render_segments(&source, &respelled, &sample_segments(), &tools, &ctx).await;
        assert!(matches!(result, Err(Error::OutputIsInput { .. })));
        assert!(source.exists());
        assert!(!FileLock::is_locked(&source));
    }

    #[tokio::test]
    async fn test_failed_render_keeps_existing_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("talk.mp4");
        let output = dir.path().join("trimmed-talk.mp4");
        fs::write(&source, b"video").unwrap();
        fs::write(&output, b"earlier render").unwrap();

        let config = Config::default();
        let multi = MultiProgress::new();
        let ctx = job_context(&config, &multi);
        let plan = build(sample_segments().as_slice()).unwrap();

        let result =
            render_with_cleanup(&source, &output, &plan, &missing_tools(dir.path()), &ctx).await;
        assert!(result.is_err());
        assert_eq!(fs::read(&output).unwrap(), b"earlier render");
        assert!(!partial_path_for(&output).exists());
    }

    #[test]
    fn test_partial_path_keeps_extension() {
        assert_eq!(
            partial_path_for(Path::new("/out/trimmed-talk.mp4")),
            PathBuf::from("/out/.trimmed-talk.partial.mp4")
        );
        assert_eq!(
            partial_path_for(Path::new("clip")),
            PathBuf::from(".clip.partial")
        );
    }

    #[test]
    fn test_write_sidecars_all_formats() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("trimmed-talk.mp4");
        let mut config = Config::default();
        config.output.segment_formats =
            vec![SegmentFormat::Csv, SegmentFormat::Audacity, SegmentFormat::Json];

        write_sidecars(
            Path::new("talk.mp4"),
            &output,
            &sample_segments(),
            10.0,
            &config,
        )
        .unwrap();

        let csv = fs::read_to_string(dir.path().join("trimmed-talk.segments.csv")).unwrap();
        assert!(csv.contains("1,5.000,10.000,5.000"));
        let labels = fs::read_to_string(dir.path().join("trimmed-talk.segments.txt")).unwrap();
        assert_eq!(labels.lines().count(), 2);
        assert!(dir.path().join("trimmed-talk.segments.json").exists());
    }

    #[test]
    fn test_write_sidecars_none_configured() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("trimmed-talk.mp4");

        write_sidecars(
            Path::new("talk.mp4"),
            &output,
            &sample_segments(),
            10.0,
            &Config::default(),
        )
        .unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a/b/trimmed-talk.mp4");
        ensure_parent_dir(&output).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
