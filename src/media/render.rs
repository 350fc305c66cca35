//! Rendering a trim plan with FFmpeg.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::command::{FfmpegCommand, FfmpegRunner};
use super::progress::{FfmpegProgress, parse_progress_line};
use crate::config::RenderConfig;
use crate::constants::render::MAX_INLINE_FILTER_LEN;
use crate::error::{Error, Result};
use crate::plan::{TrimPlan, filter_graph};

/// A render command plus the filter script it may depend on.
///
/// The script file is deleted when this value is dropped, so it must
/// outlive the FFmpeg run.
#[derive(Debug)]
pub struct RenderCommand {
    /// The command line to execute.
    pub command: FfmpegCommand,
    script: Option<NamedTempFile>,
}

impl RenderCommand {
    /// Whether the filter graph was moved into a script file.
    pub fn uses_script(&self) -> bool {
        self.script.is_some()
    }
}

/// Build the FFmpeg command that renders `plan` from `input` into `output`.
///
/// Graphs too long for a command line go through `-filter_complex_script`.
pub fn render_command(
    input: &Path,
    output: &Path,
    plan: &TrimPlan,
    settings: &RenderConfig,
) -> Result<RenderCommand> {
    let graph = filter_graph(plan);
    let concat = plan.concat();

    let mut command = FfmpegCommand::new(input, output);
    let mut script = None;

    if graph.len() > MAX_INLINE_FILTER_LEN {
        let mut file = NamedTempFile::new()?;
        file.write_all(graph.as_bytes())?;
        file.flush()?;
        debug!(
            "Filter graph is {} bytes, using script {}",
            graph.len(),
            file.path().display()
        );
        command = command.filter_complex_script(file.path());
        script = Some(file);
    } else {
        command = command.filter_complex(graph);
    }

    let command = command
        .map(&concat.video_output)
        .map(&concat.audio_output)
        .video_codec(&settings.video_codec)
        .preset(&settings.preset)
        .crf(settings.crf)
        .audio_codec(&settings.audio_codec)
        .audio_bitrate(&settings.audio_bitrate);

    Ok(RenderCommand { command, script })
}

/// Fail with [`Error::OutputIsInput`] when `output` names the same file as `input`.
///
/// Paths are resolved first, so `./talk.mp4` and `talk.mp4` compare equal.
/// `output` does not have to exist yet.
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if resolve(input) == resolve(output) {
        return Err(Error::OutputIsInput {
            path: output.to_path_buf(),
        });
    }
    Ok(())
}

fn resolve(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    // not created yet: resolve the directory it will land in
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Render `plan` and report progress against the planned output length.
pub async fn render_plan<P>(
    runner: &FfmpegRunner,
    input: &Path,
    output: &Path,
    plan: &TrimPlan,
    settings: &RenderConfig,
    mut on_progress: P,
) -> Result<()>
where
    P: FnMut(f64),
{
    ensure_distinct(input, output)?;

    let render = render_command(input, output, plan, settings)?;
    let total_secs = plan.output_duration();
    let mut progress = FfmpegProgress::default();

    runner
        .run(&render.command, "render", |line| {
            if let Some(snapshot) = parse_progress_line(line, &mut progress) {
                on_progress(snapshot.percentage(total_secs));
            }
        })
        .await?;

    drop(render);
    Ok(())
}
