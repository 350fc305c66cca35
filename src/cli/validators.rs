//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::constants::detection;

/// Parse and validate a bounded float value.
///
/// # Arguments
///
/// * `s` - The string to parse
/// * `min` - Minimum allowed value (inclusive)
/// * `max` - Maximum allowed value (inclusive)
/// * `name` - Name of the parameter for error messages
pub fn parse_bounded_float(s: &str, min: f64, max: f64, name: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || !(min..=max).contains(&value) {
        return Err(format!(
            "{name} must be between {min} and {max}, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a noise floor in dB.
///
/// A trailing `dB` suffix is accepted so `-30dB` works as well as `-30`.
pub fn parse_noise_db(s: &str) -> Result<f64, String> {
    let trimmed = s.trim();
    let number = trimmed
        .strip_suffix("dB")
        .or_else(|| trimmed.strip_suffix("db"))
        .unwrap_or(trimmed);
    parse_bounded_float(
        number,
        detection::MIN_NOISE_DB,
        detection::MAX_NOISE_DB,
        "noise floor (dB)",
    )
}

/// Parse and validate a minimum silence length in seconds.
pub fn parse_min_silence(s: &str) -> Result<f64, String> {
    parse_bounded_float(
        s,
        detection::MIN_SILENCE_SECS,
        detection::MAX_SILENCE_SECS,
        "minimum silence (seconds)",
    )
}

/// Parse a positive media duration in seconds.
pub fn parse_duration_secs(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("duration must be a positive number of seconds, got {s}"));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_noise_db_valid() {
        assert_eq!(parse_noise_db("-30").ok(), Some(-30.0));
        assert_eq!(parse_noise_db("-42.5dB").ok(), Some(-42.5));
        assert_eq!(parse_noise_db("0").ok(), Some(0.0));
        assert_eq!(parse_noise_db("-100db").ok(), Some(-100.0));
    }

    #[test]
    fn test_parse_noise_db_invalid() {
        assert!(parse_noise_db("5").is_err());
        assert!(parse_noise_db("-101").is_err());
        assert!(parse_noise_db("loud").is_err());
        assert!(parse_noise_db("NaN").is_err());
    }

    #[test]
    fn test_parse_min_silence() {
        assert_eq!(parse_min_silence("0.5").ok(), Some(0.5));
        assert_eq!(parse_min_silence("60").ok(), Some(60.0));
        assert!(parse_min_silence("0").is_err());
        assert!(parse_min_silence("61").is_err());
        assert!(parse_min_silence("-1").is_err());
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("10").ok(), Some(10.0));
        assert_eq!(parse_duration_secs(" 2.5 ").ok(), Some(2.5));
        assert!(parse_duration_secs("0").is_err());
        assert!(parse_duration_secs("inf").is_err());
        assert!(parse_duration_secs("x").is_err());
    }

    #[test]
    fn test_parse_bounded_float_error_message() {
        let err = parse_bounded_float("7", 0.0, 5.0, "level").unwrap_err();
        assert_eq!(err, "level must be between 0 and 5, got 7");
    }
}
