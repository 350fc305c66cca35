//! Configuration validation.

use crate::config::Config;
use crate::constants::{detection, render};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_detection(config)?;
    validate_output(config)?;
    validate_render(config)?;
    validate_ffmpeg(config)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

/// Validate silence detection settings.
fn validate_detection(config: &Config) -> Result<()> {
    let d = &config.detection;

    if !(detection::MIN_NOISE_DB..=detection::MAX_NOISE_DB).contains(&d.noise_db) {
        return Err(invalid(format!(
            "detection.noise_db must be between {} and {}, got {}",
            detection::MIN_NOISE_DB,
            detection::MAX_NOISE_DB,
            d.noise_db
        )));
    }

    if !(detection::MIN_SILENCE_SECS..=detection::MAX_SILENCE_SECS).contains(&d.min_silence_secs)
    {
        return Err(invalid(format!(
            "detection.min_silence_secs must be between {} and {}, got {}",
            detection::MIN_SILENCE_SECS,
            detection::MAX_SILENCE_SECS,
            d.min_silence_secs
        )));
    }

    Ok(())
}

/// Validate output naming.
fn validate_output(config: &Config) -> Result<()> {
    let o = &config.output;

    if o.container.is_empty() || !o.container.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(format!(
            "output.container must be a plain extension such as \"mp4\", got \"{}\"",
            o.container
        )));
    }

    if o.prefix.contains(['/', '\\']) {
        return Err(invalid(format!(
            "output.prefix must not contain path separators, got \"{}\"",
            o.prefix
        )));
    }

    // Without a prefix or a separate directory the output would replace the input
    if o.prefix.is_empty() && o.dir.is_none() {
        return Err(invalid(
            "output.prefix may only be empty when output.dir is set".to_string(),
        ));
    }

    Ok(())
}

/// Validate encoder settings.
fn validate_render(config: &Config) -> Result<()> {
    let r = &config.render;

    if r.crf > render::MAX_CRF {
        return Err(invalid(format!(
            "render.crf must be at most {}, got {}",
            render::MAX_CRF,
            r.crf
        )));
    }

    for (name, value) in [
        ("render.video_codec", &r.video_codec),
        ("render.audio_codec", &r.audio_codec),
        ("render.preset", &r.preset),
        ("render.audio_bitrate", &r.audio_bitrate),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(format!("{name} must not be empty")));
        }
    }

    Ok(())
}

/// Validate external tool settings.
fn validate_ffmpeg(config: &Config) -> Result<()> {
    if config.ffmpeg.timeout_secs == Some(0) {
        return Err(invalid(
            "ffmpeg.timeout_secs must be at least 1 (omit it to disable the timeout)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_noise_out_of_range() {
        let mut config = Config::default();
        config.detection.noise_db = 6.0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_validate_min_silence_too_short() {
        let mut config = Config::default();
        config.detection.min_silence_secs = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_container() {
        let mut config = Config::default();
        config.output.container = ".mp4".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_prefix_needs_dir() {
        let mut config = Config::default();
        config.output.prefix = String::new();
        assert!(validate_config(&config).is_err());

        config.output.dir = Some(PathBuf::from("/tmp/trimmed"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_crf() {
        let mut config = Config::default();
        config.render.crf = 52;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.ffmpeg.timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
