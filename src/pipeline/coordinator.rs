//! Pipeline coordination for file processing.

use crate::config::{OutputConfig, SegmentFormat};
use crate::constants::{VIDEO_EXTENSIONS, segment_extensions};
use crate::error::{Error, Result};
use crate::locking::FileLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of checking whether a file should be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessCheck {
    /// File should be processed.
    Process,
    /// Skip - output already exists.
    SkipExists,
    /// Skip - output is locked by another process.
    SkipLocked,
}

/// Determine the output directory for a file.
pub fn output_dir_for(input: &Path, explicit_output_dir: Option<&Path>) -> PathBuf {
    explicit_output_dir.map_or_else(
        || {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        Path::to_path_buf,
    )
}

/// Trimmed output path: `<dir>/<prefix><input stem>.<container>`.
pub fn output_path_for(input: &Path, output_dir: &Path, output: &OutputConfig) -> PathBuf {
    // Lossy so non-UTF-8 names still produce an output path
    let stem = input.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );

    output_dir.join(format!("{}{stem}.{}", output.prefix, output.container))
}

/// Pair every input with its output path.
///
/// Fails with [`Error::DuplicateOutput`] when two inputs map to the same
/// output (`talk.mov` and `talk.mp4` both become `trimmed-talk.mp4`), since
/// one of them would otherwise be skipped or overwritten.
pub fn assign_outputs(files: &[PathBuf], output: &OutputConfig) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(files.len());
    let mut jobs = Vec::with_capacity(files.len());

    for file in files {
        let dir = output_dir_for(file, output.dir.as_deref());
        let target = output_path_for(file, &dir, output);
        if let Some(first) = claimed.insert(target.clone(), file) {
            return Err(Error::DuplicateOutput {
                first: first.to_path_buf(),
                second: file.clone(),
                output: target,
            });
        }
        jobs.push((file.clone(), target));
    }

    Ok(jobs)
}

/// Sidecar path for a segment list written next to `output`.
pub fn sidecar_path_for(output: &Path, format: SegmentFormat) -> PathBuf {
    let stem = output.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );

    let extension = match format {
        SegmentFormat::Csv => segment_extensions::CSV,
        SegmentFormat::Audacity => segment_extensions::AUDACITY,
        SegmentFormat::Json => segment_extensions::JSON,
    };

    output.with_file_name(format!("{stem}{extension}"))
}

/// Check if a file should be processed.
pub fn should_process(output: &Path, force: bool) -> ProcessCheck {
    if FileLock::is_locked(output) {
        return ProcessCheck::SkipLocked;
    }

    if !force && output.exists() {
        return ProcessCheck::SkipExists;
    }

    ProcessCheck::Process
}

/// Collect input files from paths (files and directories).
///
/// Files named explicitly are accepted only with a video extension.
/// Directories are walked recursively; the result is sorted so batch order
/// does not depend on the filesystem.
pub fn collect_input_files(paths: &[PathBuf], prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_video_file(path) {
                files.push(path.clone());
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            collect_video_files_recursive(path, prefix, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Recursively collect video files from a directory.
///
/// Files already carrying the output prefix are earlier results and are
/// left alone, as are hidden files such as interrupted render staging files.
fn collect_video_files_recursive(dir: &Path, prefix: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_video_files_recursive(&path, prefix, files)?;
        } else if is_video_file(&path) && !is_previous_output(&path, prefix) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_previous_output(path: &Path, prefix: &str) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.to_string_lossy();
        name.starts_with('.') || (!prefix.is_empty() && name.starts_with(prefix))
    })
}

/// Check if a file has a supported video extension.
fn is_video_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy();
        VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}
