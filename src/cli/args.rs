//! CLI argument definitions.

use crate::cli::validators::{parse_duration_secs, parse_min_silence, parse_noise_db};
use crate::config::{OutputMode, SegmentFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Remove silent stretches from videos using FFmpeg.
#[derive(Debug, Parser)]
#[command(name = "quietcut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video files or directories to trim.
    pub inputs: Vec<PathBuf>,

    /// Options for trimming.
    #[command(flatten)]
    pub trim: TrimArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Turn a saved silencedetect log into segments and a filter graph.
    Plan {
        /// Log file containing FFmpeg silencedetect output.
        log: PathBuf,
        /// Duration of the source media in seconds.
        #[arg(long, value_parser = parse_duration_secs)]
        duration: f64,
    },
    /// Render a video from an edited segments CSV, skipping detection.
    Render {
        /// Source video.
        video: PathBuf,
        /// Segments CSV with `Start (s)` and `End (s)` columns.
        #[arg(long)]
        segments: PathBuf,
        /// Output file (default: prefixed name next to the video).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing output.
        #[arg(long)]
        force: bool,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for trimming.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrimArgs {
    /// Noise floor in dB; quieter audio counts as silence (e.g. -30).
    #[arg(
        short,
        long = "noise",
        value_parser = parse_noise_db,
        allow_hyphen_values = true,
        env = "QUIETCUT_NOISE_DB"
    )]
    pub noise_db: Option<f64>,

    /// Minimum silence length in seconds.
    #[arg(
        short = 'd',
        long,
        value_parser = parse_min_silence,
        env = "QUIETCUT_MIN_SILENCE"
    )]
    pub min_silence: Option<f64>,

    /// Output directory (default: same as input).
    #[arg(short, long, env = "QUIETCUT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Segment sidecar files (comma-separated: csv,audacity,json).
    #[arg(long, value_delimiter = ',', env = "QUIETCUT_SEGMENTS_FORMAT")]
    pub segments_format: Option<Vec<SegmentFormat>>,

    /// Detect and plan only; do not render.
    #[arg(long)]
    pub dry_run: bool,

    /// Reprocess files even if output exists.
    #[arg(long)]
    pub force: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Kill an FFmpeg run after this many seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), env = "QUIETCUT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Output mode for stdout.
    #[arg(
        long,
        value_enum,
        global = true,
        default_value_t = OutputMode::Human,
        env = "QUIETCUT_OUTPUT_MODE"
    )]
    pub output_mode: OutputMode,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simple() {
        let cli = Cli::try_parse_from(["quietcut", "talk.mp4"]).unwrap();
        assert_eq!(cli.inputs.len(), 1);
        assert!(cli.command.is_none());
        assert_eq!(cli.trim.output_mode, OutputMode::Human);
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "quietcut",
            "talk.mp4",
            "-n",
            "-35",
            "-d",
            "0.8",
            "--segments-format",
            "csv,json",
            "--dry-run",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.trim.noise_db, Some(-35.0));
        assert_eq!(cli.trim.min_silence, Some(0.8));
        assert_eq!(
            cli.trim.segments_format,
            Some(vec![SegmentFormat::Csv, SegmentFormat::Json])
        );
        assert!(cli.trim.dry_run);
        assert!(cli.trim.quiet);
    }

    #[test]
    fn test_cli_rejects_out_of_range_noise() {
        assert!(Cli::try_parse_from(["quietcut", "talk.mp4", "--noise", "12"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["quietcut", "talk.mp4", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_cli_parse_plan_subcommand() {
        let cli = Cli::try_parse_from([
            "quietcut",
            "plan",
            "detect.log",
            "--duration",
            "10",
            "--output-mode",
            "json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Plan { log, duration }) => {
                assert_eq!(log, PathBuf::from("detect.log"));
                assert_eq!(duration, 10.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.trim.output_mode, OutputMode::Json);
    }

    #[test]
    fn test_cli_parse_render_subcommand() {
        let cli = Cli::try_parse_from([
            "quietcut",
            "render",
            "talk.mp4",
            "--segments",
            "talk.segments.csv",
            "-o",
            "out.mp4",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Render { output: Some(_), force: false, .. })
        ));
    }

    #[test]
    fn test_cli_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["quietcut", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["quietcut", "a.mp4", "-q", "-v"]).is_err());
    }
}
