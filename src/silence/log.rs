//! Adapter from FFmpeg `silencedetect` log output to typed events.
//!
//! The detector prints lines such as:
//!
//! ```text
//! [silencedetect @ 0x55d5c8a3f240] silence_start: 2.00113
//! [silencedetect @ 0x55d5c8a3f240] silence_end: 5.01 | silence_duration: 3.00887
//! ```
//!
//! mixed in with unrelated encoder chatter. Lines that do not carry a
//! marker, or whose marker has no parsable number, are skipped.

use crate::constants::detection::{SILENCE_END_MARKER, SILENCE_START_MARKER};

use super::SilenceEvent;

/// Scan a single log line for silence markers.
///
/// Yields at most two events. When both markers appear on the same line
/// the `Start` comes first.
pub fn scan_line(line: &str) -> impl Iterator<Item = SilenceEvent> + use<> {
    let start = marker_value(line, SILENCE_START_MARKER).map(SilenceEvent::Start);
    let end = marker_value(line, SILENCE_END_MARKER).map(SilenceEvent::End);
    start.into_iter().chain(end)
}

/// Convert a sequence of log lines into silence events in arrival order.
pub fn events_from_lines<I, S>(lines: I) -> Vec<SilenceEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .flat_map(|line| scan_line(line.as_ref()))
        .collect()
}

/// Convert a whole detector log into silence events.
pub fn events_from_text(text: &str) -> Vec<SilenceEvent> {
    events_from_lines(text.lines())
}

/// Extract the number following `marker`, ignoring any trailing annotation.
fn marker_value(line: &str, marker: &str) -> Option<f64> {
    let idx = line.find(marker)?;
    let rest = line[idx + marker.len()..].trim_start();

    // FFmpeg reports tiny negative starts at the head of a stream
    let (negative, digits) = match rest.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, rest),
    };

    let value = leading_number(digits)?;
    Some(if negative { 0.0 } else { value })
}

/// Parse the leading decimal number, e.g. `5.01` out of `5.01 | ...`.
///
/// Digits with at most one decimal point, optionally followed by an
/// exponent: FFmpeg prints timestamps with `%g`, so a silence one sample in
/// reads `2.08333e-05`. An `e` not followed by digits ends the number.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            end = exp + digits;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_start_line() {
        let events: Vec<_> =
            scan_line("[silencedetect @ 0x55d5c8a3f240] silence_start: 2.00113").collect();
        assert_eq!(events, vec![SilenceEvent::Start(2.00113)]);
    }

    #[test]
    fn test_scan_end_line_drops_trailing_text() {
        let events: Vec<_> =
            scan_line("[silencedetect @ 0x1] silence_end: 5.01 | silence_duration: 3.00887")
                .collect();
        assert_eq!(events, vec![SilenceEvent::End(5.01)]);
    }

    #[test]
    fn test_unrelated_line_is_ignored() {
        assert_eq!(scan_line("frame=  120 fps= 30 q=-0.0 size=N/A").count(), 0);
        assert_eq!(scan_line("").count(), 0);
    }

    #[test]
    fn test_marker_without_number_is_ignored() {
        assert_eq!(scan_line("silence_start: N/A").count(), 0);
        assert_eq!(scan_line("silence_end: .").count(), 0);
    }

    #[test]
    fn test_negative_start_clamps_to_zero() {
        let events: Vec<_> = scan_line("silence_start: -0.00133333").collect();
        assert_eq!(events, vec![SilenceEvent::Start(0.0)]);
    }

    #[test]
    fn test_second_decimal_point_terminates_number() {
        assert_eq!(leading_number("1.2.3"), Some(1.2));
        assert_eq!(leading_number("7."), Some(7.0));
        assert_eq!(leading_number(".5"), Some(0.5));
    }

    #[test]
    fn test_exponent_notation() {
        let events: Vec<_> =
            scan_line("[silencedetect @ 0x1] silence_start: 2.08333e-05").collect();
        assert_eq!(events, vec![SilenceEvent::Start(2.083_33e-5)]);

        let events: Vec<_> =
            scan_line("[silencedetect @ 0x1] silence_end: 1.2e+06 | silence_duration: 3e+02")
                .collect();
        assert_eq!(events, vec![SilenceEvent::End(1.2e6)]);

        assert_eq!(leading_number("4E3"), Some(4000.0));
        assert_eq!(leading_number("3e"), Some(3.0));
        assert_eq!(leading_number("3e-"), Some(3.0));
        assert_eq!(leading_number("7e|"), Some(7.0));
    }

    #[test]
    fn test_negative_exponent_start_is_not_audible_lead() {
        let events = events_from_text(
            "silence_start: 2.08333e-05\nsilence_end: 4 | silence_duration: 3.99998\n",
        );
        let intervals = crate::silence::sweep(events, 10.0);
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].end < 1e-4);
        assert_eq!(intervals[1], crate::silence::Interval::new(4.0, 10.0));
    }

    #[test]
    fn test_both_markers_start_first() {
        let events: Vec<_> = scan_line("silence_end: 4 silence_start: 6").collect();
        assert_eq!(events, vec![SilenceEvent::Start(6.0), SilenceEvent::End(4.0)]);
    }

    #[test]
    fn test_events_from_text_keeps_arrival_order() {
        let log = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'talk.mp4':
[silencedetect @ 0x1] silence_start: 2
[silencedetect @ 0x1] silence_end: 5 | silence_duration: 3
size=N/A time=00:00:10.00 bitrate=N/A speed= 512x
[silencedetect @ 0x1] silence_start: 8.5
";
        let events = events_from_text(log);
        assert_eq!(
            events,
            vec![
                SilenceEvent::Start(2.0),
                SilenceEvent::End(5.0),
                SilenceEvent::Start(8.5),
            ]
        );
    }
}
